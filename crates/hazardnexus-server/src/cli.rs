use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hazardnexus")]
#[command(author, version, about = "Real-time hazard aggregation service")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "hazardnexus.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API and the periodic collector
    Serve {
        /// Listen address
        #[arg(short = 'l', long)]
        listen: Option<String>,

        /// Listen port
        #[arg(short = 'P', long)]
        port: Option<u16>,

        /// Minutes between scheduled collection cycles
        #[arg(short, long)]
        interval: Option<u64>,

        /// Also collect satellite, bulletin, flood and air quality sources
        #[arg(long)]
        bulletins: bool,

        /// Skip the collection cycle at startup
        #[arg(long)]
        no_initial_run: bool,
    },

    /// Run one full collection cycle (including bulletins) and exit
    Collect,
}
