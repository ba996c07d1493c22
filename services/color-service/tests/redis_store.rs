//! `RedisStore` against a scripted RESP server, plus live tests that need a
//! real Redis (`cargo test -- --ignored`, host from `REDIS_HOST`).

use color_service::{ColorStore, RedisStore, StoreConfig, StoreError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

// ============================================================================
// Scripted server
// ============================================================================

type Script = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Start a server that answers every RESP command with `script(args)`.
/// Connection setup commands (`CLIENT`, `SELECT`, `PING`) get an OK.
async fn scripted_redis<F>(script: F) -> SocketAddr
where
    F: Fn(&[String]) -> String + Send + Sync + 'static,
{
    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let script: Script = Arc::new(script);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let script = script.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);
                while let Some(args) = read_command(&mut reader).await {
                    let reply = match args[0].to_uppercase().as_str() {
                        "CLIENT" | "SELECT" => "+OK\r\n".to_string(),
                        "PING" => "+PONG\r\n".to_string(),
                        _ => script(&args),
                    };
                    if write.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

async fn read_command<R>(reader: &mut BufReader<R>) -> Option<Vec<String>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

fn bulk(value: &str) -> String {
    format!("${}\r\n{}\r\n", value.len(), value)
}

fn scan_reply(cursor: &str, keys: &[&str]) -> String {
    let mut reply = format!("*2\r\n{}*{}\r\n", bulk(cursor), keys.len());
    for key in keys {
        reply.push_str(&bulk(key));
    }
    reply
}

async fn connect(addr: SocketAddr) -> RedisStore {
    let config = StoreConfig::new(addr.ip().to_string()).port(addr.port());
    RedisStore::connect(&config).await.unwrap()
}

#[tokio::test]
async fn values_follow_every_scan_page_and_skip_nil() {
    let addr = scripted_redis(|args| {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["SCAN", "0", ..] => scan_reply("17", &["a", "b"]),
            ["SCAN", "17", ..] => scan_reply("0", &["c"]),
            ["MGET", "a", "b", "c"] => format!("*3\r\n{}$-1\r\n{}", bulk("red"), bulk("blue")),
            _ => "-ERR unexpected command\r\n".to_string(),
        }
    })
    .await;
    let store = connect(addr).await;

    let values = store.values().await.unwrap();

    assert_eq!(values, vec!["red".to_string(), "blue".to_string()]);
}

#[tokio::test]
async fn values_read_a_single_key_with_mget() {
    let addr = scripted_redis(|args| {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["SCAN", "0", ..] => scan_reply("0", &["1700000000000"]),
            ["MGET", "1700000000000"] => format!("*1\r\n{}", bulk("green")),
            _ => "-ERR unexpected command\r\n".to_string(),
        }
    })
    .await;
    let store = connect(addr).await;

    assert_eq!(store.values().await.unwrap(), vec!["green".to_string()]);
}

#[tokio::test]
async fn values_fail_when_a_later_scan_page_fails() {
    let addr = scripted_redis(|args| {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["SCAN", "0", ..] => scan_reply("42", &["a"]),
            ["SCAN", "42", ..] => "-ERR scan interrupted\r\n".to_string(),
            ["MGET", ..] => format!("*1\r\n{}", bulk("red")),
            _ => "-ERR unexpected command\r\n".to_string(),
        }
    })
    .await;
    let store = connect(addr).await;

    let result = store.values().await;

    assert!(matches!(result, Err(StoreError::Command(_))), "{result:?}");
}

#[tokio::test]
async fn values_of_empty_database_skip_mget() {
    let addr = scripted_redis(|args| match args[0].as_str() {
        "SCAN" => scan_reply("0", &[]),
        _ => "-ERR unexpected command\r\n".to_string(),
    })
    .await;
    let store = connect(addr).await;

    assert!(store.values().await.unwrap().is_empty());
}

#[tokio::test]
async fn keys_exist_and_flush_send_expected_commands() {
    let addr = scripted_redis(|args| {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["DBSIZE"] => ":3\r\n".to_string(),
            ["FLUSHDB", "ASYNC"] => "+OK\r\n".to_string(),
            ["SET", "1", "red"] => "+OK\r\n".to_string(),
            _ => "-ERR unexpected command\r\n".to_string(),
        }
    })
    .await;
    let store = connect(addr).await;

    store.ping().await.unwrap();
    assert!(store.keys_exist().await.unwrap());
    store.set_key("1", "red").await.unwrap();
    store.flush().await.unwrap();
}

#[tokio::test]
async fn operations_after_close_fail() {
    let addr = scripted_redis(|_| "-ERR unexpected command\r\n".to_string()).await;
    let store = connect(addr).await;

    store.close().await;

    assert!(matches!(store.ping().await, Err(StoreError::Closed)));
    assert!(matches!(store.values().await, Err(StoreError::Closed)));
    assert!(matches!(
        store.set_key("1", "red").await,
        Err(StoreError::Closed)
    ));
}

// ============================================================================
// Live Redis
// ============================================================================

/// Each live test gets its own logical database so they can run in parallel.
async fn live_store(db: i64) -> RedisStore {
    let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
    let store = RedisStore::connect(&StoreConfig::new(host).db(db))
        .await
        .unwrap();
    store.flush().await.unwrap();
    store
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn live_single_key() {
    let store = live_store(11).await;

    store.set_key("1700000000000", "red").await.unwrap();

    assert!(store.keys_exist().await.unwrap());
    assert_eq!(store.values().await.unwrap(), vec!["red".to_string()]);
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn live_many_keys() {
    let store = live_store(12).await;

    for i in 0..250 {
        let color = ["red", "blue", "green"][i % 3];
        store.set_key(&i.to_string(), color).await.unwrap();
    }

    let values = store.values().await.unwrap();
    assert_eq!(values.len(), 250);
    assert_eq!(values.iter().filter(|v| *v == "green").count(), 83);
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn live_flush_empties_database() {
    let store = live_store(13).await;
    store.set_key("1", "blue").await.unwrap();

    store.flush().await.unwrap();

    // FLUSHDB ASYNC removes keys from the keyspace before returning.
    assert!(!store.keys_exist().await.unwrap());
    assert!(store.values().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn live_non_string_values_are_skipped() {
    let store = live_store(14).await;
    store.set_key("1", "green").await.unwrap();

    let host = std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
    let client = redis::Client::open(StoreConfig::new(host).db(14).url()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: () = redis::cmd("RPUSH")
        .arg("2")
        .arg("red")
        .query_async(&mut conn)
        .await
        .unwrap();

    assert_eq!(store.values().await.unwrap(), vec!["green".to_string()]);
}

#[tokio::test]
#[ignore = "needs a running Redis"]
async fn live_operations_after_close_fail() {
    let store = live_store(15).await;

    store.close().await;

    assert!(matches!(store.keys_exist().await, Err(StoreError::Closed)));
    assert!(matches!(store.flush().await, Err(StoreError::Closed)));
}
