//! CLI argument definitions

use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(
    name = "netscope",
    about = "Capture live traffic and stream classified packet events to WebSocket viewers",
    after_help = "\
EXAMPLES:
    sudo netscope                        Capture on the first usable interface
    sudo netscope eth0                   Capture on an explicit interface
    sudo netscope --listen 0.0.0.0:8000  Accept viewers from other hosts"
)]
pub struct Args {
    /// Interface to capture on (default: first up, non-loopback interface
    /// with an IPv4 address)
    #[arg(value_name = "INTERFACE")]
    pub interface: Option<String>,

    /// Address to serve the scan and streaming endpoints on
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub listen: SocketAddr,

    /// Initial inter-packet throttle delay in seconds (adjustable live
    /// over the control channel)
    #[arg(long, default_value_t = 0.0)]
    pub delay: f64,

    /// Suppress non-essential output (warnings and errors only)
    #[arg(short, long)]
    pub quiet: bool,
}
