use httpd::{Config, Handler, Request, Response, StatusCode, rt};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream},
    net::{TcpListener, TcpStream},
};

// ===== Application =====

struct App;

impl Handler for App {
    async fn serve(&self, req: &mut Request<'_>, res: &mut Response<'_>) {
        let path = req.path().to_owned();
        let body = match path.as_str() {
            "/" | "/ignore" => return,
            "/hello" => b"Hello, World!".to_vec(),
            "/html" => b"<html><body>hi</body></html>".to_vec(),
            "/status" => {
                res.set_status(StatusCode::NOT_FOUND);
                res.set_status(StatusCode::OK);
                b"missing".to_vec()
            }
            "/echo" => match req.body_mut().bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(_) => {
                    res.set_status(StatusCode::BAD_REQUEST);
                    b"bad body".to_vec()
                }
            },
            "/large" => {
                for i in 0..100u8 {
                    res.write_all(&[b'a' + i % 26; 100]).await.unwrap();
                }
                return;
            }
            "/query" => format!(
                "{}:{}:{}",
                req.query("a").unwrap_or("-"),
                req.query("bad").unwrap_or("-"),
                req.cookie("y").unwrap_or("-"),
            )
            .into_bytes(),
            "/form" => {
                let name = req.post_form("name").await.unwrap_or("-").to_owned();
                // cached outcome
                assert_eq!(req.post_form("name").await.unwrap_or("-"), name);
                name.into_bytes()
            }
            "/upload" => match req.form_file("file").await {
                Ok(file) => format!(
                    "{}:{}:{}",
                    file.file_name(),
                    file.size(),
                    file.tmp_path().map(|p| p.display().to_string()).unwrap_or_default()
                )
                .into_bytes(),
                Err(err) => err.to_string().into_bytes(),
            },
            "/close" => {
                res.headers_mut().unwrap().insert("Connection", "close");
                b"bye".to_vec()
            }
            "/panic" => panic!("handler failure"),
            _ => {
                res.set_status(StatusCode::NOT_FOUND);
                return;
            }
        };
        res.write_all(&body).await.unwrap();
    }
}

// ===== Client =====

struct Client {
    io: BufReader<DuplexStream>,
}

#[derive(Debug)]
struct Reply {
    status: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Reply {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn connect(config: Config) -> Client {
    let (client, server) = tokio::io::duplex(64 * 1024);
    tokio::spawn(async move {
        rt::serve_connection(server, &App, &config).await;
    });
    Client {
        io: BufReader::new(client),
    }
}

impl Client {
    async fn send(&mut self, data: &[u8]) {
        self.io.get_mut().write_all(data).await.unwrap();
    }

    async fn line(&mut self) -> String {
        let mut line = String::new();
        self.io.read_line(&mut line).await.unwrap();
        line.trim_end_matches("\r\n").to_owned()
    }

    async fn reply(&mut self) -> Reply {
        let status = self.line().await;
        let mut headers = Vec::new();
        loop {
            let line = self.line().await;
            if line.is_empty() {
                break;
            }
            let (name, value) = line.split_once(": ").unwrap();
            headers.push((name.to_owned(), value.to_owned()));
        }

        let mut reply = Reply {
            status,
            headers,
            body: Vec::new(),
        };

        if reply.header("transfer-encoding") == Some("chunked") {
            loop {
                let size = usize::from_str_radix(&self.line().await, 16).unwrap();
                if size == 0 {
                    assert_eq!(self.line().await, "");
                    break;
                }
                let start = reply.body.len();
                reply.body.resize(start + size, 0);
                self.io.read_exact(&mut reply.body[start..]).await.unwrap();
                assert_eq!(self.line().await, "");
            }
        } else if let Some(len) = reply.header("content-length") {
            let mut body = vec![0; len.parse().unwrap()];
            self.io.read_exact(&mut body).await.unwrap();
            reply.body = body;
        }

        reply
    }

    /// Read until the server closes the connection.
    async fn rest(mut self) -> Vec<u8> {
        let mut rest = Vec::new();
        self.io.read_to_end(&mut rest).await.unwrap();
        rest
    }
}

// ===== Tests =====

#[tokio::test]
async fn keep_alive() {
    let mut client = connect(Config::new());

    client.send(b"GET /hello HTTP/1.1\r\nHost: a\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 200 OK");
    assert_eq!(reply.header("content-length"), Some("13"));
    assert_eq!(reply.body, b"Hello, World!");

    client.send(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 200 OK");
    assert_eq!(reply.header("content-length"), Some("0"));
    assert_eq!(reply.header("content-type"), None);
    assert!(reply.body.is_empty());

    client.send(b"GET /missing HTTP/1.1\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 404 Not Found");
}

#[tokio::test]
async fn http10_closes_after_reply() {
    let mut client = connect(Config::new());
    client.send(b"GET /hello HTTP/1.0\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.0 200 OK");
    assert_eq!(reply.body, b"Hello, World!");
    assert!(client.rest().await.is_empty());
}

#[tokio::test]
async fn http10_large_body_is_not_chunked() {
    let mut client = connect(Config::new());
    client.send(b"GET /large HTTP/1.0\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.0 200 OK");
    assert_eq!(reply.header("transfer-encoding"), None);
    assert_eq!(reply.header("content-length"), None);

    let body = client.rest().await;
    assert_eq!(body.len(), 10_000);
    assert!(body[9_900..].iter().all(|&b| b == b'a' + 99 % 26));
}

#[tokio::test]
async fn connection_close() {
    let mut client = connect(Config::new());
    client.send(b"GET /hello HTTP/1.1\r\nConnection: close\r\n\r\n").await;
    assert_eq!(client.reply().await.body, b"Hello, World!");
    assert!(client.rest().await.is_empty());

    let mut client = connect(Config::new());
    client.send(b"GET /close HTTP/1.1\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.header("connection"), Some("close"));
    assert_eq!(reply.body, b"bye");
    assert!(client.rest().await.is_empty());
}

#[tokio::test]
async fn content_sniffing() {
    let mut client = connect(Config::new());

    client.send(b"GET /html HTTP/1.1\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.header("content-type"), Some("text/html; charset=utf-8"));

    client.send(b"GET /hello HTTP/1.1\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.header("content-type"), Some("text/plain; charset=utf-8"));
}

#[tokio::test]
async fn status_is_set_once() {
    let mut client = connect(Config::new());
    client.send(b"GET /status HTTP/1.1\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 404 Not Found");
    assert_eq!(reply.body, b"missing");
}

#[tokio::test]
async fn fixed_length_body() {
    let mut client = connect(Config::new());

    client.send(b"POST /echo HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello").await;
    client.send(b" world").await;
    assert_eq!(client.reply().await.body, b"hello world");

    // a GET body is not framed, the bytes are read as the next request
    client.send(b"GET /echo HTTP/1.1\r\nContent-Length: 3\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.header("content-length"), Some("0"));
}

#[tokio::test]
async fn unread_body_is_discarded() {
    let mut client = connect(Config::new());
    client.send(b"POST /hello HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloGET /hello HTTP/1.1\r\n\r\n").await;
    assert_eq!(client.reply().await.body, b"Hello, World!");
    assert_eq!(client.reply().await.body, b"Hello, World!");
}

#[tokio::test]
async fn chunked_request() {
    let mut client = connect(Config::new());
    client
        .send(b"POST /echo HTTP/1.1\r\nTransfer-Encoding: chunked\r\nContent-Length: 1\r\n\r\n")
        .await;
    client.send(b"5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n").await;
    assert_eq!(client.reply().await.body, b"hello world");

    client.send(b"GET /hello HTTP/1.1\r\n\r\n").await;
    assert_eq!(client.reply().await.body, b"Hello, World!");
}

#[tokio::test]
async fn invalid_chunk_closes() {
    let mut client = connect(Config::new());
    client
        .send(b"POST /echo HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\nhello\r\n")
        .await;
    client.io.get_mut().shutdown().await.unwrap();

    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 400 Bad Request");
    assert_eq!(reply.body, b"bad body");
    assert!(client.rest().await.is_empty());
}

#[tokio::test]
async fn chunk_size_line_is_bounded() {
    let mut client = connect(Config::new());
    client.send(b"POST /echo HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n").await;
    client.send(&[b'0'; 8 * 1024]).await;
    client.send(b"5\r\nhello\r\n0\r\n\r\n").await;
    client.io.get_mut().shutdown().await.unwrap();

    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 400 Bad Request");
    assert_eq!(reply.body, b"bad body");
    assert!(client.rest().await.is_empty());
}

#[tokio::test]
async fn chunked_response() {
    let mut client = connect(Config::new());
    client.send(b"GET /large HTTP/1.1\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.header("transfer-encoding"), Some("chunked"));
    assert_eq!(reply.header("content-length"), None);
    assert_eq!(reply.body.len(), 10_000);
    assert!(reply.body[..100].iter().all(|&b| b == b'a'));
    assert!(reply.body[9_900..].iter().all(|&b| b == b'a' + 99 % 26));

    // small response buffer
    let mut client = connect(Config::new().response_buffer_size(8));
    client.send(b"GET /hello HTTP/1.1\r\n\r\n").await;
    let reply = client.reply().await;
    assert_eq!(reply.header("transfer-encoding"), Some("chunked"));
    assert_eq!(reply.body, b"Hello, World!");
}

#[tokio::test]
async fn expect_continue() {
    let mut client = connect(Config::new());
    client
        .send(b"POST /echo HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 4\r\n\r\n")
        .await;
    assert_eq!(client.line().await, "HTTP/1.1 100 Continue");
    assert_eq!(client.line().await, "");

    client.send(b"ping").await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 200 OK");
    assert_eq!(reply.body, b"ping");
}

#[tokio::test]
async fn expect_continue_without_read() {
    let mut client = connect(Config::new());
    client
        .send(b"POST /ignore HTTP/1.1\r\nExpect: 100-continue\r\nContent-Length: 4\r\n\r\n")
        .await;
    let reply = client.reply().await;
    assert_eq!(reply.status, "HTTP/1.1 200 OK");
    assert_eq!(reply.header("content-length"), Some("0"));

    // no interim response, the body is never requested
    assert!(client.rest().await.is_empty());
}

#[tokio::test]
async fn query_and_cookies() {
    let mut client = connect(Config::new());
    client
        .send(b"GET /query?a=1&b=2&bad HTTP/1.1\r\nCookie: x=1; y=2\r\n\r\n")
        .await;
    assert_eq!(client.reply().await.body, b"1:-:2");
}

#[tokio::test]
async fn urlencoded_form() {
    let mut client = connect(Config::new());
    let body = "name=alice&x=1";
    client
        .send(
            format!(
                "POST /form HTTP/1.1\r\n\
                Content-Type: application/x-www-form-urlencoded\r\n\
                Content-Length: {}\r\n\r\n{body}",
                body.len()
            )
            .as_bytes(),
        )
        .await;
    assert_eq!(client.reply().await.body, b"alice");

    client.send(b"GET /form HTTP/1.1\r\n\r\n").await;
    assert_eq!(client.reply().await.body, b"-");
}

#[tokio::test]
async fn multipart_upload_is_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().max_file_memory(16).temp_dir(dir.path());
    let mut client = connect(config);

    let content = "x".repeat(1000);
    let body = format!(
        "--b\r\n\
        Content-Disposition: form-data; name=\"file\"; filename=\"x.txt\"\r\n\r\n\
        {content}\r\n\
        --b--\r\n"
    );
    client
        .send(
            format!(
                "POST /upload HTTP/1.1\r\n\
                Content-Type: multipart/form-data; boundary=\"b\"\r\n\
                Content-Length: {}\r\n\r\n{body}",
                body.len()
            )
            .as_bytes(),
        )
        .await;

    let reply = client.reply().await;
    let body = String::from_utf8(reply.body).unwrap();
    let (prefix, path) = body.split_at("x.txt:1000:".len());
    assert_eq!(prefix, "x.txt:1000:");
    assert!(path.starts_with(&dir.path().display().to_string()));
    assert!(!std::path::Path::new(path).exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn missing_boundary() {
    let mut client = connect(Config::new());
    client
        .send(b"POST /upload HTTP/1.1\r\nContent-Type: multipart/form-data\r\nContent-Length: 0\r\n\r\n")
        .await;
    assert_eq!(client.reply().await.body, b"no multipart boundary");
}

#[tokio::test]
async fn handler_panic_is_contained() {
    let mut client = connect(Config::new());
    client.send(b"GET /panic HTTP/1.1\r\n\r\n").await;
    assert!(client.rest().await.is_empty());

    let mut client = connect(Config::new());
    client.send(b"GET /hello HTTP/1.1\r\n\r\n").await;
    assert_eq!(client.reply().await.body, b"Hello, World!");
}

#[tokio::test]
async fn malformed_request_closes() {
    let cases: [&[u8]; 4] = [
        b"GET / HTTP/1.1\r\nNoColon\r\n\r\n",
        b"GET /\r\n\r\n",
        b"GET / HTTP/x\r\n\r\n",
        b"G(T / HTTP/1.1\r\n\r\n",
    ];
    for input in cases {
        let mut client = connect(Config::new());
        client.send(input).await;
        assert!(client.rest().await.is_empty());
    }
}

#[tokio::test]
async fn header_size_limit() {
    let mut client = connect(Config::new().max_header_size(64));
    client.send(b"GET /hello HTTP/1.1\r\nHost: a\r\n\r\n").await;
    assert_eq!(client.reply().await.body, b"Hello, World!");

    // the limit applies to every request on the connection
    let long = format!("GET /hello HTTP/1.1\r\nX-Long: {}\r\n\r\n", "a".repeat(100));
    client.send(long.as_bytes()).await;
    assert!(client.rest().await.is_empty());
}

#[tokio::test]
async fn tcp_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(rt::serve(listener, App));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /hello HTTP/1.0\r\n\r\n").await.unwrap();
    let mut out = String::new();
    stream.read_to_string(&mut out).await.unwrap();
    assert!(out.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(out.ends_with("\r\n\r\nHello, World!"));
}
