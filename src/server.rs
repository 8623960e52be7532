use parking_lot::Mutex;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

use crate::aof::{self, AofWriter, FsyncPolicy};
use crate::codec::{FrameCodec, ProtocolError, MAX_BULK_SIZE};
use crate::commands::executable::{Executable, Session};
use crate::commands::{lookup_frame, Command};
use crate::connection::Connection;
use crate::frame::{EmptyCollection, Frame};
use crate::store::{spawn_active_expiry, Store};
use crate::Error;

const AOF_SYNC_INTERVAL: Duration = Duration::from_secs(1);
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Server settings, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub databases: usize,
    pub appendonly: bool,
    pub appendfilename: PathBuf,
    pub appendfsync: FsyncPolicy,
    /// Connections silent for this long are closed. `None` keeps them forever.
    pub idle_timeout: Option<Duration>,
    pub empty_collection: EmptyCollection,
    pub max_frame_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "127.0.0.1".to_string(),
            port: 6379,
            databases: 16,
            appendonly: false,
            appendfilename: PathBuf::from("appendonly.aof"),
            appendfsync: FsyncPolicy::default(),
            idle_timeout: None,
            empty_collection: EmptyCollection::default(),
            max_frame_size: MAX_BULK_SIZE,
        }
    }
}

type Aof = Arc<Mutex<AofWriter>>;

/// State every connection handler shares.
#[derive(Clone)]
struct Shared {
    store: Store,
    aof: Option<Aof>,
    config: Arc<Config>,
}

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.bind.as_str(), config.port)).await?;

    serve(listener, config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for the shutdown signal: {}", e);
        }
    })
    .await
}

/// Accepts clients on `listener` until `shutdown` completes.
pub async fn serve(
    listener: TcpListener,
    config: Config,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Error> {
    let store = Store::new(config.databases);

    let aof = if config.appendonly {
        aof::replay(&config.appendfilename, &store)?;
        let writer = AofWriter::open(&config.appendfilename, config.appendfsync)?;
        Some(Arc::new(Mutex::new(writer)))
    } else {
        None
    };

    let expiry = spawn_active_expiry(store.clone());
    let aof_sync = aof
        .clone()
        .filter(|aof| aof.lock().policy() == FsyncPolicy::EverySec)
        .map(spawn_aof_sync);

    let shared = Shared {
        store,
        aof,
        config: Arc::new(config),
    };

    info!("Redis server listening on {}", listener.local_addr()?);

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            (socket, client_address) = accept_retrying(|| listener.accept()) => {
                let shared = shared.clone();
                info!("Accepted connection from {:?}", client_address);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, client_address, shared).await {
                        error!("Connection failed: {}", e);
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    expiry.abort();
    if let Some(task) = aof_sync {
        task.abort();
    }
    if let Some(aof) = &shared.aof {
        let mut aof = aof.lock();
        aof.sync()?;
        info!("Synced {}", aof.path().display());
    }

    Ok(())
}

/// Keeps calling `accept` until it yields a client. Failures such as EMFILE or ECONNABORTED
/// leave the listener usable, so they are logged and retried after a short pause.
async fn accept_retrying<T, F, Fut>(mut accept: F) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<T>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(e) => {
                error!("Failed to accept a connection: {}", e);
                time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

fn spawn_aof_sync(aof: Aof) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(AOF_SYNC_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = aof.lock().sync() {
                error!("Failed to sync the append-only file: {}", e);
            }
        }
    })
}

#[instrument(
    name = "connection",
    skip(stream, shared),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    shared: Shared,
) -> Result<(), Error> {
    let codec = FrameCodec::new(shared.config.max_frame_size, shared.config.empty_collection);
    let mut conn = Connection::with_codec(stream, codec);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    let mut session = Session::new(shared.store.clone());

    loop {
        let read = match shared.config.idle_timeout {
            Some(limit) => match time::timeout(limit, conn.read_frame()).await {
                Ok(read) => read,
                Err(_) => {
                    info!("Closing idle connection");
                    break;
                }
            },
            None => conn.read_frame().await,
        };

        let frame = match read {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(ProtocolError::Io(e)) => return Err(e.into()),
            Err(e) => {
                // The stream position is lost, nothing after this can be trusted.
                warn!("Protocol error: {}", e);
                conn.write_frame(Frame::Error(e.to_string())).await?;
                break;
            }
        };

        debug!("Received frame from client: {:?}", frame);
        let (response, quit) = execute(&shared, &mut session, frame);
        debug!("Sending response to client: {:?}", response);
        conn.write_frame(response).await?;

        if quit {
            break;
        }
    }

    info!("Connection closed");
    Ok(())
}

/// Runs one request. The flag tells whether the client asked to close the connection.
fn execute(shared: &Shared, session: &mut Session, frame: Frame) -> (Frame, bool) {
    let argv = match &shared.aof {
        Some(_) if lookup_frame(&frame).is_some_and(|spec| spec.write) => aof::argv(&frame),
        _ => None,
    };

    let cmd = match Command::try_from(frame) {
        Ok(cmd) => cmd,
        Err(e) => return (Frame::Error(e.to_string()), false),
    };
    let quit = matches!(cmd, Command::Quit(_));

    let (Some(aof), Some(argv)) = (&shared.aof, argv) else {
        return (exec(cmd, session), quit);
    };

    // Writes are logged in the order they are applied.
    let mut aof = aof.lock();
    let response = exec(cmd, session);
    for record in aof::records(argv, &response, session.db()) {
        if let Err(e) = aof.append(session.db_index(), &record) {
            error!("Failed to append to the append-only file: {}", e);
        }
    }

    (response, quit)
}

fn exec(cmd: Command, session: &mut Session) -> Frame {
    match cmd.exec(session) {
        Ok(frame) => frame,
        Err(e) => {
            error!("Command failed: {}", e);
            Frame::Error("ERR internal error".to_string())
        }
    }
}
