#![allow(dead_code)]

use std::{net::SocketAddr, path::Path, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use jailftpd::config::Config;
use jailftpd::server::{Server, ServerExit};
use tempfile::TempDir;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    task::JoinHandle,
    time::timeout,
};

pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

pub fn config_toml(root: &Path) -> String {
    format!(
        r#"
[server]
server_name = "127.0.0.1"
port = 0
root = "{}"
data_timeout_secs = 5

[[user]]
username = "alice"
password = "secret"
root = "/alice"

[[user]]
username = "bob"
password = "hunter2"
root = "/bob"
"#,
        root.display()
    )
}

/// A server bound to an ephemeral port over a temporary jail tree.
pub struct TestServer {
    pub server: Arc<Server>,
    pub addr: SocketAddr,
    pub root: TempDir,
    task: JoinHandle<ServerExit>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let root = TempDir::new()?;
        std::fs::create_dir(root.path().join("alice"))?;
        std::fs::create_dir(root.path().join("bob"))?;

        let config = Config::from_toml(&config_toml(root.path()))?;
        let server = Arc::new(Server::new(config));
        let listener = server.bind().await?;
        let addr = listener.local_addr()?;

        let task = {
            let server = Arc::clone(&server);
            tokio::spawn(async move { server.serve(listener).await })
        };

        Ok(TestServer {
            server,
            addr,
            root,
            task,
        })
    }

    /// Filesystem path inside alice's jail.
    pub fn alice_path(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join("alice").join(name)
    }

    pub async fn connect(&self) -> Result<Client> {
        let mut client = Client::connect(self.addr).await?;
        let (code, _) = client.reply().await?;
        if code != 220 {
            bail!("unexpected greeting {}", code);
        }
        Ok(client)
    }

    pub async fn login(&self) -> Result<Client> {
        let mut client = self.connect().await?;
        client.expect("USER alice", 331).await?;
        client.expect("PASS secret", 230).await?;
        Ok(client)
    }

    pub async fn stopped(self) -> Result<ServerExit> {
        timeout(READ_TIMEOUT, self.task)
            .await
            .context("server did not stop")?
            .context("server task panicked")
    }
}

/// Minimal FTP control-connection client.
pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, writer) = stream.into_split();
        Ok(Client {
            reader: BufReader::new(read_half),
            writer,
        })
    }

    pub async fn send(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(format!("{}\r\n", line).as_bytes()).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes).await?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for a reply")??;
        if n == 0 {
            bail!("control connection closed");
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    /// Reads one reply, following `NNN-` continuation lines. Returns the
    /// code and every line after the code, joined with newlines.
    pub async fn reply(&mut self) -> Result<(u16, String)> {
        let first = self.read_line().await?;
        let code: u16 = first
            .get(..3)
            .and_then(|code| code.parse().ok())
            .ok_or_else(|| anyhow!("malformed reply {:?}", first))?;
        let mut text = first.get(4..).unwrap_or("").to_string();

        if first.as_bytes().get(3) == Some(&b'-') {
            let last = format!("{} ", code);
            loop {
                let line = self.read_line().await?;
                text.push('\n');
                if let Some(rest) = line.strip_prefix(&last) {
                    text.push_str(rest);
                    break;
                }
                text.push_str(&line);
            }
        }
        Ok((code, text))
    }

    pub async fn command(&mut self, line: &str) -> Result<(u16, String)> {
        self.send(line).await?;
        self.reply().await
    }

    pub async fn expect(&mut self, line: &str, code: u16) -> Result<String> {
        let (got, text) = self.command(line).await?;
        if got != code {
            bail!("{:?}: expected {}, got {} {}", line, code, got, text);
        }
        Ok(text)
    }

    /// Sends PASV and connects to the announced data port.
    pub async fn pasv(&mut self) -> Result<TcpStream> {
        let text = self.expect("PASV", 227).await?;
        let addr = parse_pasv(&text)?;
        Ok(TcpStream::connect(addr).await?)
    }

    /// True once the server has closed the control connection.
    pub async fn closed(&mut self) -> Result<bool> {
        let mut line = String::new();
        let n = timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .context("timed out waiting for close")??;
        Ok(n == 0)
    }
}

pub fn parse_pasv(text: &str) -> Result<SocketAddr> {
    let inner = text
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or_else(|| anyhow!("no address in {:?}", text))?;
    let parts: Vec<u16> = inner
        .split(',')
        .map(|part| part.trim().parse())
        .collect::<Result<_, _>>()?;
    let [h1, h2, h3, h4, p1, p2] = parts[..] else {
        bail!("bad PASV address {:?}", inner);
    };
    Ok(format!("{}.{}.{}.{}:{}", h1, h2, h3, h4, p1 << 8 | p2).parse()?)
}

pub async fn read_all(mut stream: TcpStream) -> Result<Vec<u8>> {
    use tokio::io::AsyncReadExt;
    let mut data = Vec::new();
    timeout(READ_TIMEOUT, stream.read_to_end(&mut data))
        .await
        .context("timed out reading data connection")??;
    Ok(data)
}
