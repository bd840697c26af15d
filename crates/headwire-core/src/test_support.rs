//! Local HTTP stand-ins for feed servers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How the server answers one connection
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    /// Accept and read the request, then never answer
    Hang,
    /// Read the request and hang up without a response
    Close,
    /// Send headers announcing a body of this many bytes, then stall
    Declared(u64),
}

impl Reply {
    pub fn ok(body: String) -> Self {
        Reply::Status(200, body)
    }

    pub fn status(code: u16) -> Self {
        Reply::Status(code, String::new())
    }
}

/// Plays `script` one reply per connection, repeating the last reply
pub struct StubServer {
    addr: std::net::SocketAddr,
    hits: Arc<AtomicUsize>,
    accept: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub async fn start(script: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let accept = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let reply = script.get(n).or(script.last()).cloned().unwrap_or(Reply::Close);
                tokio::spawn(answer(stream, reply));
            }
        });

        Self { addr, hits, accept }
    }

    pub fn url(&self) -> String {
        format!("http://{}/feed.xml", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.accept.abort();
    }
}

async fn answer(mut stream: TcpStream, reply: Reply) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    match reply {
        Reply::Status(code, body) => {
            let head = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                code,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(body.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        Reply::Hang => {
            std::future::pending::<()>().await;
        }
        Reply::Close => drop(stream),
        Reply::Declared(len) => {
            let head = format!(
                "HTTP/1.1 200 Stub\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                len
            );
            let _ = stream.write_all(head.as_bytes()).await;
            std::future::pending::<()>().await;
        }
    }
}

/// A one-item RSS document
pub fn rss_item(title: &str, link: &str, published: DateTime<Utc>) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Stub</title>
    <link>http://stub/</link>
    <description>stub feed</description>
    <item>
      <title>{}</title>
      <link>{}</link>
      <pubDate>{}</pubDate>
    </item>
  </channel>
</rss>"#,
        title,
        link,
        published.to_rfc2822()
    )
}
