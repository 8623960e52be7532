use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, RedisResult};
use serial_test::serial;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use ferrodis::aof::FsyncPolicy;
use ferrodis::frame::EmptyCollection;
use ferrodis::server::{serve, Config};

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<ferrodis::Result<()>>,
}

impl TestServer {
    async fn start(config: Config) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(listener, config, async {
            let _ = rx.await;
        }));

        TestServer {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    async fn connect(&self) -> MultiplexedConnection {
        self.connect_db(0).await
    }

    async fn connect_db(&self, db: usize) -> MultiplexedConnection {
        let client = redis::Client::open(format!("redis://{}/{}", self.addr, db)).unwrap();
        client.get_multiplexed_async_connection().await.unwrap()
    }

    async fn raw(&self) -> TcpStream {
        TcpStream::connect(self.addr).await.unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

async fn connect() -> (TestServer, MultiplexedConnection) {
    let server = TestServer::start(Config::default()).await;
    let con = server.connect().await;
    (server, con)
}

/// Writes `request` and reads until `expected.len()` bytes have arrived.
async fn roundtrip(stream: &mut TcpStream, request: &[u8], expected: &[u8]) {
    stream.write_all(request).await.unwrap();

    let mut buf = vec![0; expected.len()];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(
        String::from_utf8_lossy(&buf),
        String::from_utf8_lossy(expected)
    );
}

async fn assert_closed(stream: &mut TcpStream) {
    let mut buf = [0; 16];
    let n = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .unwrap()
        .unwrap_or(0);
    assert_eq!(n, 0);
}

fn assert_wrong_type<T: std::fmt::Debug>(result: RedisResult<T>) {
    let err = result.unwrap_err();
    assert!(err.to_string().contains("WRONGTYPE"), "{err}");
}

#[tokio::test]
async fn test_ping_and_echo() {
    let (_server, mut con) = connect().await;

    let pong: String = redis::cmd("PING").query_async(&mut con).await.unwrap();
    assert_eq!(pong, "PONG");

    let echoed: String = redis::cmd("ECHO")
        .arg("Hello, World!")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(echoed, "Hello, World!");
}

#[tokio::test]
async fn test_set_and_get() {
    let (_server, mut con) = connect().await;

    let (one, country, missing): (i64, String, Option<String>) = redis::pipe()
        .cmd("SET")
        .arg("set_get_key_1")
        .arg(1)
        .ignore()
        .cmd("SET")
        .arg("set_get_key_2")
        .arg("Argentina")
        .ignore()
        .cmd("GET")
        .arg("set_get_key_1")
        .cmd("GET")
        .arg("set_get_key_2")
        .cmd("GET")
        .arg("set_get_nonexistentkey")
        .query_async(&mut con)
        .await
        .unwrap();

    assert_eq!(one, 1);
    assert_eq!(country, "Argentina");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_set_conditions() {
    let (_server, mut con) = connect().await;

    let set: Option<String> = redis::cmd("SET")
        .arg("k")
        .arg("v1")
        .arg("XX")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(set, None);

    let set: Option<String> = redis::cmd("SET")
        .arg("k")
        .arg("v1")
        .arg("NX")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(set.as_deref(), Some("OK"));

    let set: Option<String> = redis::cmd("SET")
        .arg("k")
        .arg("v2")
        .arg("NX")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(set, None);

    let value: String = con.get("k").await.unwrap();
    assert_eq!(value, "v1");

    let err = redis::cmd("SET")
        .arg("k")
        .arg("v")
        .arg("NX")
        .arg("XX")
        .query_async::<_, ()>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("syntax error"), "{err}");
}

#[tokio::test]
async fn test_counters() {
    let (_server, mut con) = connect().await;

    let (a, b, c, d): (i64, i64, i64, i64) = redis::pipe()
        .cmd("INCR")
        .arg("counter")
        .cmd("INCRBY")
        .arg("counter")
        .arg(10)
        .cmd("DECR")
        .arg("counter")
        .cmd("DECRBY")
        .arg("counter")
        .arg(5)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!((a, b, c, d), (1, 11, 10, 5));

    let float: f64 = redis::cmd("INCRBYFLOAT")
        .arg("counter")
        .arg("0.5")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(float, 5.5);

    let _: () = con.set("word", "abc").await.unwrap();
    let err = con.incr::<_, _, i64>("word", 1).await.unwrap_err();
    assert!(err.to_string().contains("not an integer"), "{err}");

    let _: () = con.set("max", i64::MAX).await.unwrap();
    let err = con.incr::<_, _, i64>("max", 1).await.unwrap_err();
    assert!(err.to_string().contains("overflow"), "{err}");
}

#[tokio::test]
async fn test_mset_mget_append_strlen() {
    let (_server, mut con) = connect().await;

    let _: () = redis::cmd("MSET")
        .arg("mset_key_1")
        .arg("Argentina")
        .arg("mset_key_2")
        .arg("Spain")
        .query_async(&mut con)
        .await
        .unwrap();

    let values: Vec<Option<String>> = redis::cmd("MGET")
        .arg("mset_key_1")
        .arg("mset_key_2")
        .arg("nonexisting")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(
        values,
        vec![Some("Argentina".to_string()), Some("Spain".to_string()), None]
    );

    let len: i64 = con.append("mset_key_2", "!!").await.unwrap();
    assert_eq!(len, 7);

    let len: i64 = con.strlen("mset_key_2").await.unwrap();
    assert_eq!(len, 7);

    let len: i64 = con.strlen("nonexisting").await.unwrap();
    assert_eq!(len, 0);
}

#[tokio::test]
async fn test_keyspace_commands() {
    let (_server, mut con) = connect().await;

    let _: () = redis::cmd("MSET")
        .arg("key:1")
        .arg(1)
        .arg("key:2")
        .arg(2)
        .arg("other")
        .arg(3)
        .query_async(&mut con)
        .await
        .unwrap();

    let exists: i64 = redis::cmd("EXISTS")
        .arg("key:1")
        .arg("key:1")
        .arg("missing")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(exists, 2);

    let mut keys: Vec<String> = con.keys("key:*").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["key:1", "key:2"]);

    let size: i64 = redis::cmd("DBSIZE").query_async(&mut con).await.unwrap();
    assert_eq!(size, 3);

    let kind: String = redis::cmd("TYPE")
        .arg("other")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(kind, "string");

    let random: String = redis::cmd("RANDOMKEY")
        .query_async(&mut con)
        .await
        .unwrap();
    assert!(["key:1", "key:2", "other"].contains(&random.as_str()));

    let deleted: i64 = con.del(&["key:1", "key:2", "missing"]).await.unwrap();
    assert_eq!(deleted, 2);

    let _: () = redis::cmd("FLUSHDB").query_async(&mut con).await.unwrap();
    let size: i64 = redis::cmd("DBSIZE").query_async(&mut con).await.unwrap();
    assert_eq!(size, 0);

    let random: Option<String> = redis::cmd("RANDOMKEY")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(random, None);
}

#[tokio::test]
#[serial]
async fn test_expire_and_ttl() {
    let (_server, mut con) = connect().await;

    let _: () = con.set("persistent", "v").await.unwrap();
    let ttl: i64 = con.ttl("persistent").await.unwrap();
    assert_eq!(ttl, -1);

    let ttl: i64 = con.ttl("missing").await.unwrap();
    assert_eq!(ttl, -2);

    let _: () = redis::cmd("SET")
        .arg("volatile")
        .arg("v")
        .arg("EX")
        .arg(100)
        .query_async(&mut con)
        .await
        .unwrap();
    let ttl: i64 = con.ttl("volatile").await.unwrap();
    assert!((99..=100).contains(&ttl), "{ttl}");

    let removed: i64 = con.persist("volatile").await.unwrap();
    assert_eq!(removed, 1);
    let ttl: i64 = con.ttl("volatile").await.unwrap();
    assert_eq!(ttl, -1);

    let set: i64 = con.pexpire("volatile", 100).await.unwrap();
    assert_eq!(set, 1);
    let pttl: i64 = con.pttl("volatile").await.unwrap();
    assert!(pttl > 0 && pttl <= 100, "{pttl}");

    tokio::time::sleep(Duration::from_millis(250)).await;

    let value: Option<String> = con.get("volatile").await.unwrap();
    assert_eq!(value, None);
    let exists: bool = con.exists("volatile").await.unwrap();
    assert!(!exists);

    // A deadline in the past deletes the key right away.
    let _: () = con.set("past", "v").await.unwrap();
    let set: i64 = con.expire_at("past", 1).await.unwrap();
    assert_eq!(set, 1);
    let exists: bool = con.exists("past").await.unwrap();
    assert!(!exists);

    let set: i64 = con.expire("missing", 10).await.unwrap();
    assert_eq!(set, 0);
}

#[tokio::test]
async fn test_lists() {
    let (_server, mut con) = connect().await;

    let len: i64 = con.rpush("list", &["b", "c"]).await.unwrap();
    assert_eq!(len, 2);
    let len: i64 = con.lpush("list", "a").await.unwrap();
    assert_eq!(len, 3);

    let all: Vec<String> = con.lrange("list", 0, -1).await.unwrap();
    assert_eq!(all, vec!["a", "b", "c"]);

    let tail: Vec<String> = con.lrange("list", -2, 100).await.unwrap();
    assert_eq!(tail, vec!["b", "c"]);

    let empty: Vec<String> = con.lrange("list", 5, 10).await.unwrap();
    assert!(empty.is_empty());

    let second: Option<String> = con.lindex("list", 1).await.unwrap();
    assert_eq!(second.as_deref(), Some("b"));

    let _: () = con.lset("list", -1, "z").await.unwrap();
    let err = con.lset::<_, _, ()>("list", 10, "x").await.unwrap_err();
    assert!(err.to_string().contains("index out of range"), "{err}");

    let len: i64 = redis::cmd("LINSERT")
        .arg("list")
        .arg("BEFORE")
        .arg("z")
        .arg("y")
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(len, 4);

    let popped: Option<String> = con.lpop("list", None).await.unwrap();
    assert_eq!(popped.as_deref(), Some("a"));

    let popped: Vec<String> = con
        .rpop("list", std::num::NonZeroUsize::new(2))
        .await
        .unwrap();
    assert_eq!(popped, vec!["z", "y"]);

    let moved: Option<String> = con.rpoplpush("list", "other").await.unwrap();
    assert_eq!(moved.as_deref(), Some("b"));

    // Popping the last element removes the key.
    let exists: bool = con.exists("list").await.unwrap();
    assert!(!exists);
    let len: i64 = con.llen("other").await.unwrap();
    assert_eq!(len, 1);

    let _: () = con.rpush("dups", &["x", "y", "x", "x"]).await.unwrap();
    let removed: i64 = con.lrem("dups", -2, "x").await.unwrap();
    assert_eq!(removed, 2);
    let all: Vec<String> = con.lrange("dups", 0, -1).await.unwrap();
    assert_eq!(all, vec!["x", "y"]);
}

#[tokio::test]
async fn test_hashes() {
    let (_server, mut con) = connect().await;

    let added: i64 = redis::cmd("HSET")
        .arg("user")
        .arg("name")
        .arg("Ada")
        .arg("age")
        .arg(36)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(added, 2);

    let name: String = con.hget("user", "name").await.unwrap();
    assert_eq!(name, "Ada");

    let missing: Option<String> = con.hget("user", "email").await.unwrap();
    assert_eq!(missing, None);

    let exists: bool = con.hexists("user", "age").await.unwrap();
    assert!(exists);

    let age: i64 = con.hincr("user", "age", 1).await.unwrap();
    assert_eq!(age, 37);

    let err = con.hincr::<_, _, _, i64>("user", "name", 1).await.unwrap_err();
    assert!(err.to_string().contains("hash value is not an integer"), "{err}");

    let mut all: Vec<(String, String)> = con.hgetall("user").await.unwrap();
    all.sort();
    assert_eq!(
        all,
        vec![
            ("age".to_string(), "37".to_string()),
            ("name".to_string(), "Ada".to_string())
        ]
    );

    let mut keys: Vec<String> = con.hkeys("user").await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["age", "name"]);

    let len: i64 = con.hlen("user").await.unwrap();
    assert_eq!(len, 2);

    let removed: i64 = con.hdel("user", &["name", "age", "email"]).await.unwrap();
    assert_eq!(removed, 2);

    let exists: bool = con.exists("user").await.unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn test_sets() {
    let (_server, mut con) = connect().await;

    let added: i64 = con.sadd("set", &["a", "b", "c", "a"]).await.unwrap();
    assert_eq!(added, 3);

    let card: i64 = con.scard("set").await.unwrap();
    assert_eq!(card, 3);

    let member: bool = con.sismember("set", "b").await.unwrap();
    assert!(member);

    let mut members: Vec<String> = con.smembers("set").await.unwrap();
    members.sort();
    assert_eq!(members, vec!["a", "b", "c"]);

    let random: Vec<String> = redis::cmd("SRANDMEMBER")
        .arg("set")
        .arg(-5)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(random.len(), 5);
    assert!(random.iter().all(|m| members.contains(m)));

    let random: Vec<String> = redis::cmd("SRANDMEMBER")
        .arg("set")
        .arg(10)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(random.len(), 3);

    let removed: i64 = con.srem("set", &["a", "z"]).await.unwrap();
    assert_eq!(removed, 1);

    let popped: Vec<String> = redis::cmd("SPOP")
        .arg("set")
        .arg(5)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(popped.len(), 2);

    let exists: bool = con.exists("set").await.unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn test_sorted_sets() {
    let (_server, mut con) = connect().await;

    let added: i64 = con
        .zadd_multiple("board", &[(1.0, "one"), (2.0, "two"), (3.0, "three")])
        .await
        .unwrap();
    assert_eq!(added, 3);

    let members: Vec<String> = con.zrange("board", 0, -1).await.unwrap();
    assert_eq!(members, vec!["one", "two", "three"]);

    let reversed: Vec<(String, f64)> = con.zrevrange_withscores("board", 0, 1).await.unwrap();
    assert_eq!(
        reversed,
        vec![("three".to_string(), 3.0), ("two".to_string(), 2.0)]
    );

    let score: f64 = con.zincr("board", "one", 5).await.unwrap();
    assert_eq!(score, 6.0);

    let score: Option<f64> = con.zscore("board", "one").await.unwrap();
    assert_eq!(score, Some(6.0));

    let rank: Option<i64> = con.zrank("board", "one").await.unwrap();
    assert_eq!(rank, Some(2));
    let rank: Option<i64> = con.zrevrank("board", "one").await.unwrap();
    assert_eq!(rank, Some(0));
    let rank: Option<i64> = con.zrank("board", "missing").await.unwrap();
    assert_eq!(rank, None);

    let in_range: Vec<String> = con.zrangebyscore("board", "(2", "+inf").await.unwrap();
    assert_eq!(in_range, vec!["three", "one"]);

    let count: i64 = con.zcount("board", "-inf", 3).await.unwrap();
    assert_eq!(count, 2);

    let limited: Vec<String> = redis::cmd("ZRANGEBYSCORE")
        .arg("board")
        .arg("-inf")
        .arg("+inf")
        .arg("LIMIT")
        .arg(1)
        .arg(1)
        .query_async(&mut con)
        .await
        .unwrap();
    assert_eq!(limited, vec!["three"]);

    let err = con
        .zrangebyscore::<_, _, _, Vec<String>>("board", "abc", 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("min or max is not a float"), "{err}");

    let removed: i64 = con.zrembyscore("board", 0, 2).await.unwrap();
    assert_eq!(removed, 1);

    let removed: i64 = con.zremrangebyrank("board", 0, 0).await.unwrap();
    assert_eq!(removed, 1);

    let card: i64 = con.zcard("board").await.unwrap();
    assert_eq!(card, 1);

    let removed: i64 = con.zrem("board", "one").await.unwrap();
    assert_eq!(removed, 1);

    let exists: bool = con.exists("board").await.unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn test_wrong_type() {
    let (_server, mut con) = connect().await;

    let _: () = con.set("string", "v").await.unwrap();
    let _: () = con.rpush("list", "v").await.unwrap();

    assert_wrong_type(con.lpush::<_, _, i64>("string", "v").await);
    assert_wrong_type(con.hget::<_, _, Option<String>>("string", "f").await);
    assert_wrong_type(con.sadd::<_, _, i64>("string", "m").await);
    assert_wrong_type(con.zadd::<_, _, _, i64>("string", "m", 1).await);
    assert_wrong_type(con.get::<_, Option<String>>("list").await);
    assert_wrong_type(con.incr::<_, _, i64>("list", 1).await);

    // The failed writes left both keys untouched.
    let value: String = con.get("string").await.unwrap();
    assert_eq!(value, "v");
    let len: i64 = con.llen("list").await.unwrap();
    assert_eq!(len, 1);
}

#[tokio::test]
async fn test_command_errors() {
    let (_server, mut con) = connect().await;

    let err = redis::cmd("NOTACOMMAND")
        .query_async::<_, ()>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown command"), "{err}");

    let err = redis::cmd("GET")
        .query_async::<_, ()>(&mut con)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("wrong number of arguments"), "{err}");

    // The connection stays usable after an error reply.
    let pong: String = redis::cmd("PING").query_async(&mut con).await.unwrap();
    assert_eq!(pong, "PONG");
}

#[tokio::test]
async fn test_select_isolates_databases() {
    let server = TestServer::start(Config::default()).await;
    let mut db0 = server.connect().await;
    let mut db1 = server.connect_db(1).await;

    let _: () = db1.set("key", "in db 1").await.unwrap();

    let value: Option<String> = db0.get("key").await.unwrap();
    assert_eq!(value, None);
    let value: String = db1.get("key").await.unwrap();
    assert_eq!(value, "in db 1");

    let err = redis::cmd("SELECT")
        .arg(16)
        .query_async::<_, ()>(&mut db0)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("DB index is out of range"), "{err}");
}

#[tokio::test]
async fn test_raw_request_reply() {
    let server = TestServer::start(Config::default()).await;
    let mut stream = server.raw().await;

    roundtrip(
        &mut stream,
        b"*3\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\nb\r\n",
        b"+OK\r\n",
    )
    .await;
    roundtrip(&mut stream, b"*2\r\n$3\r\nGET\r\n$1\r\na\r\n", b"$1\r\nb\r\n").await;
    roundtrip(&mut stream, b"GET missing\r\n", b"$-1\r\n").await;

    // Pipelined requests are answered in order.
    roundtrip(
        &mut stream,
        b"PING\r\nEXISTS a\r\nLRANGE nothing 0 -1\r\n",
        b"+PONG\r\n:1\r\n*0\r\n",
    )
    .await;
}

#[tokio::test]
async fn test_quit_closes_connection() {
    let server = TestServer::start(Config::default()).await;
    let mut stream = server.raw().await;

    roundtrip(&mut stream, b"QUIT\r\n", b"+OK\r\n").await;
    assert_closed(&mut stream).await;
}

#[tokio::test]
async fn test_protocol_error_closes_connection() {
    let server = TestServer::start(Config::default()).await;
    let mut stream = server.raw().await;

    roundtrip(
        &mut stream,
        b"*1\r\n+OK\r\n",
        b"-ERR Protocol error: expected '$', got '+'\r\n",
    )
    .await;
    assert_closed(&mut stream).await;
}

#[tokio::test]
async fn test_empty_collection_as_error() {
    let server = TestServer::start(Config {
        empty_collection: EmptyCollection::Error,
        ..Config::default()
    })
    .await;
    let mut stream = server.raw().await;

    roundtrip(
        &mut stream,
        b"LRANGE nothing 0 -1\r\n",
        b"-ERR empty collection\r\n",
    )
    .await;
}

#[tokio::test]
#[serial]
async fn test_idle_timeout() {
    let server = TestServer::start(Config {
        idle_timeout: Some(Duration::from_millis(100)),
        ..Config::default()
    })
    .await;
    let mut stream = server.raw().await;

    roundtrip(&mut stream, b"PING\r\n", b"+PONG\r\n").await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_closed(&mut stream).await;
}

#[tokio::test]
#[serial]
async fn test_append_only_file_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        appendonly: true,
        appendfilename: dir.path().join("appendonly.aof"),
        appendfsync: FsyncPolicy::Always,
        ..Config::default()
    };

    let server = TestServer::start(config.clone()).await;
    let mut con = server.connect().await;
    let mut db2 = server.connect_db(2).await;

    let _: () = con.set("name", "ferrodis").await.unwrap();
    let _: () = con.rpush("list", &["a", "b", "c"]).await.unwrap();
    let _: Option<String> = con.lpop("list", None).await.unwrap();
    let _: () = con.hset("hash", "field", 1).await.unwrap();
    let _: () = con.zadd("zset", "m", 2.5).await.unwrap();
    let _: () = con.set("gone", "v").await.unwrap();
    let _: () = con.del("gone").await.unwrap();
    let _: () = redis::cmd("SET")
        .arg("volatile")
        .arg("v")
        .arg("EX")
        .arg(1000)
        .query_async(&mut con)
        .await
        .unwrap();
    let _: () = db2.set("other", "db").await.unwrap();
    // Rejected writes are not logged.
    assert_wrong_type(con.lpush::<_, _, i64>("name", "v").await);

    drop(con);
    drop(db2);
    server.stop().await;

    let server = TestServer::start(config).await;
    let mut con = server.connect().await;
    let mut db2 = server.connect_db(2).await;

    let name: String = con.get("name").await.unwrap();
    assert_eq!(name, "ferrodis");

    let list: Vec<String> = con.lrange("list", 0, -1).await.unwrap();
    assert_eq!(list, vec!["b", "c"]);

    let field: i64 = con.hget("hash", "field").await.unwrap();
    assert_eq!(field, 1);

    let score: Option<f64> = con.zscore("zset", "m").await.unwrap();
    assert_eq!(score, Some(2.5));

    let exists: bool = con.exists("gone").await.unwrap();
    assert!(!exists);

    let ttl: i64 = con.ttl("volatile").await.unwrap();
    assert!((990..=1000).contains(&ttl), "{ttl}");

    let other: String = db2.get("other").await.unwrap();
    assert_eq!(other, "db");
    let other: Option<String> = con.get("other").await.unwrap();
    assert_eq!(other, None);
}
