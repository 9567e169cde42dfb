use httpd::{Config, Handler, Request, Response, StatusCode};
use std::io;
use tokio::net::TcpListener;

const INDEX: &str = r#"<!DOCTYPE html>
<html>
<body>
  <form action="/echo" method="post">
    <input name="message"> <button>Echo</button>
  </form>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="file"> <button>Upload</button>
  </form>
</body>
</html>
"#;

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config = Config::new().max_file_memory(1024 * 1024);
    let io = TcpListener::bind("0.0.0.0:3000").await?;
    log::info!("listening on http://{}", io.local_addr()?);

    httpd::rt::serve(io, App).with_config(config).await;
    Ok(())
}

struct App;

impl Handler for App {
    async fn serve(&self, req: &mut Request<'_>, res: &mut Response<'_>) {
        let path = req.path().to_owned();
        let result = match path.as_str() {
            "/" => res.write_all(INDEX.as_bytes()).await,
            "/echo" => echo(req, res).await,
            "/upload" => upload(req, res).await,
            _ => {
                res.set_status(StatusCode::NOT_FOUND);
                res.write_all(b"Not Found").await
            }
        };
        if let Err(err) = result {
            log::error!("failed to write response: {err}");
        }
    }
}

async fn echo(req: &mut Request<'_>, res: &mut Response<'_>) -> io::Result<()> {
    let message = match req.post_form("message").await {
        Some(message) => message.to_owned(),
        None => {
            res.set_status(StatusCode::BAD_REQUEST);
            return res.write_all(b"missing message").await;
        }
    };
    res.write_all(message.as_bytes()).await
}

async fn upload(req: &mut Request<'_>, res: &mut Response<'_>) -> io::Result<()> {
    let file = match req.form_file("file").await {
        Ok(file) => file,
        Err(err) => {
            res.set_status(StatusCode::BAD_REQUEST);
            return res.write_all(err.to_string().as_bytes()).await;
        }
    };

    let location = match file.tmp_path() {
        Some(path) => format!("temporary file {}", path.display()),
        None => "memory".to_owned(),
    };
    let summary = format!(
        "received {:?}, {} bytes, stored in {location}\n",
        file.file_name(),
        file.size(),
    );
    res.write_all(summary.as_bytes()).await
}
