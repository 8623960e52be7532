use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ferrodis::aof::FsyncPolicy;
use ferrodis::codec::MAX_BULK_SIZE;
use ferrodis::frame::EmptyCollection;
use ferrodis::server::{self, Config};
use ferrodis::Error;

const PORT: u16 = 6379;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// The address to listen on
    #[arg(long, env = "FERRODIS_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// The port to listen on
    #[arg(short, long, env = "FERRODIS_PORT", default_value_t = PORT)]
    port: u16,

    /// Number of databases a client can SELECT
    #[arg(long, env = "FERRODIS_DATABASES", default_value_t = 16)]
    databases: usize,

    /// Log every write to the append-only file and replay it at startup
    #[arg(long, env = "FERRODIS_APPENDONLY")]
    appendonly: bool,

    /// Path of the append-only file
    #[arg(long, env = "FERRODIS_APPENDFILENAME", default_value = "appendonly.aof")]
    appendfilename: PathBuf,

    /// When the append-only file is fsynced
    #[arg(long, env = "FERRODIS_APPENDFSYNC", value_enum, default_value_t = FsyncPolicy::EverySec)]
    appendfsync: FsyncPolicy,

    /// Close connections idle for this many seconds, 0 to never close them
    #[arg(long, env = "FERRODIS_IDLE_TIMEOUT", default_value_t = 0)]
    idle_timeout: u64,

    /// How an empty array reply is sent
    #[arg(long, env = "FERRODIS_EMPTY_COLLECTION", value_enum, default_value_t = EmptyCollection::Array)]
    empty_collection: EmptyCollection,

    /// Largest request, in bytes, a client may send
    #[arg(long, env = "FERRODIS_MAX_FRAME_SIZE", default_value_t = MAX_BULK_SIZE)]
    max_frame_size: usize,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            bind: args.bind,
            port: args.port,
            databases: args.databases.max(1),
            appendonly: args.appendonly,
            appendfilename: args.appendfilename,
            appendfsync: args.appendfsync,
            idle_timeout: (args.idle_timeout > 0).then(|| Duration::from_secs(args.idle_timeout)),
            empty_collection: args.empty_collection,
            max_frame_size: args.max_frame_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    server::run(args.into()).await
}
