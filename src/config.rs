use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::log_window::WindowMode;

/// Exposes nginx request-time percentiles for Prometheus.
#[derive(Parser, Debug)]
#[command(name = "nginx-latency-exporter", version)]
pub struct Args {
    /// Path to the nginx access log.
    #[arg(short = 'f', long = "file", env = "NGINXRT_LOG_FILE")]
    pub log_file: PathBuf,

    /// Read the whole log file and ignore the 5 minute look-back.
    #[arg(short = 'l', long = "full-log", env = "NGINXRT_FULL_LOG")]
    pub full_log: bool,

    /// Port for the /metrics endpoint.
    #[arg(short = 'p', long, env = "NGINXRT_PORT", default_value_t = 9900)]
    pub port: u16,

    /// Address to listen on.
    #[arg(long, env = "NGINXRT_BIND", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,

    /// Seconds between refreshes.
    #[arg(
        short = 'i',
        long,
        env = "NGINXRT_INTERVAL",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Args {
    pub fn mode(&self) -> WindowMode {
        WindowMode::from_full_log_flag(self.full_log)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("nginx-latency-exporter").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_tail_mode_on_port_9900() {
        let args = parse(&["-f", "/var/log/nginx/access.log"]).unwrap();

        assert_eq!(args.log_file, PathBuf::from("/var/log/nginx/access.log"));
        assert_eq!(args.mode(), WindowMode::Tail);
        assert_eq!(args.listen_addr(), "0.0.0.0:9900".parse::<SocketAddr>().unwrap());
        assert_eq!(args.refresh_period(), Duration::from_secs(60));
        assert!(!args.verbose);
    }

    #[test]
    fn full_log_flag_switches_mode() {
        let args = parse(&["-f", "access.log", "-l", "-p", "9100"]).unwrap();
        assert_eq!(args.mode(), WindowMode::FullFile);
        assert_eq!(args.port, 9100);
    }

    #[test]
    fn long_options_are_accepted() {
        let args = parse(&[
            "--file",
            "access.log",
            "--bind",
            "127.0.0.1",
            "--interval",
            "15",
        ])
        .unwrap();
        assert_eq!(args.listen_addr(), "127.0.0.1:9900".parse::<SocketAddr>().unwrap());
        assert_eq!(args.refresh_period(), Duration::from_secs(15));
    }

    #[test]
    fn log_file_is_required() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = parse(&["-f", "access.log", "-i", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn help_is_available() {
        let err = parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
