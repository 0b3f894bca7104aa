//! Command line configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use cetok_common::DEFAULT_RECEIVER_PORT;

/// Create Kubernetes Jobs from CloudEvents
#[derive(Parser, Debug, Clone)]
#[command(name = "cetokjob", version, about, long_about = None)]
pub struct Cli {
    /// Job template files (YAML lists of templates)
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Port for the CloudEvents HTTP receiver
    #[arg(long, env = "CETOKJOB_PORT", default_value_t = DEFAULT_RECEIVER_PORT)]
    pub port: u16,

    /// Namespace to create Jobs in (defaults to the pod's own namespace)
    #[arg(long, env = "CETOKJOB_NAMESPACE")]
    pub namespace: Option<String>,
}

impl Cli {
    /// Address the receiver listens on
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
