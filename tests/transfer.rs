mod common;

use std::time::Duration;

use anyhow::Result;
use common::{read_all, TestServer};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

#[tokio::test]
async fn list_over_passive_connection() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("b.txt"), b"hello")?;
    std::fs::create_dir(server.alice_path("a"))?;

    let mut client = server.login().await?;
    let data = client.pasv().await?;
    client.send("LIST").await?;
    let listing = String::from_utf8(read_all(data).await?)?;
    assert_eq!(client.reply().await?.0, 200);

    let lines: Vec<&str> = listing.split_terminator("\r\n").collect();
    assert_eq!(lines.len(), 2, "{:?}", listing);
    assert!(lines[0].starts_with('d') && lines[0].ends_with(" a"));
    assert!(lines[1].starts_with('-') && lines[1].ends_with(" b.txt"));

    let data = client.pasv().await?;
    client.send("NLST -a").await?;
    let names = String::from_utf8(read_all(data).await?)?;
    assert_eq!(client.reply().await?.0, 200);
    assert_eq!(names, "a\r\nb.txt\r\n");
    Ok(())
}

#[tokio::test]
async fn transfer_without_data_connection() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("file.txt"), b"x")?;

    let mut client = server.login().await?;
    client.expect("RETR file.txt", 425).await?;
    client.expect("LIST", 425).await?;
    client.expect("RETR", 501).await?;
    client.expect("STOR", 501).await?;
    Ok(())
}

#[tokio::test]
async fn retrieve_and_store() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("source.bin"), b"0123456789")?;

    let mut client = server.login().await?;
    client.expect("TYPE I", 200).await?;

    let data = client.pasv().await?;
    client.send("RETR source.bin").await?;
    assert_eq!(read_all(data).await?, b"0123456789");
    assert_eq!(client.reply().await?.0, 200);

    let mut data = client.pasv().await?;
    client.send("STOR upload.bin").await?;
    data.write_all(b"uploaded").await?;
    drop(data);
    assert_eq!(client.reply().await?.0, 200);
    assert_eq!(std::fs::read(server.alice_path("upload.bin"))?, b"uploaded");

    let mut data = client.pasv().await?;
    client.send("APPE upload.bin").await?;
    data.write_all(b" more").await?;
    drop(data);
    assert_eq!(client.reply().await?.0, 200);
    assert_eq!(std::fs::read(server.alice_path("upload.bin"))?, b"uploaded more");

    let data = client.pasv().await?;
    client.send("RETR missing.bin").await?;
    let _ = read_all(data).await?;
    assert_eq!(client.reply().await?.0, 450);
    Ok(())
}

#[tokio::test]
async fn store_unique_keeps_existing_file() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("report.txt"), b"first draft")?;

    let mut client = server.login().await?;
    let mut data = client.pasv().await?;
    client.send("STOU report.txt").await?;
    data.write_all(b"second").await?;
    drop(data);

    let (code, text) = client.reply().await?;
    assert_eq!(code, 200);
    let stored = text
        .strip_prefix("FILE: /")
        .expect("reply names the stored file");
    assert_ne!(stored, "report.txt");
    assert!(stored.starts_with("report.txt."));

    assert_eq!(std::fs::read(server.alice_path("report.txt"))?, b"first draft");
    assert_eq!(std::fs::read(server.alice_path(stored))?, b"second");
    Ok(())
}

#[tokio::test]
async fn extended_passive_mode() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("e.txt"), b"epsv")?;

    let mut client = server.login().await?;
    client.expect("EPSV 3", 522).await?;
    let text = client.expect("EPSV 1", 229).await?;
    let port: u16 = text
        .split('|')
        .nth(3)
        .expect("port field")
        .parse()?;

    let data = tokio::net::TcpStream::connect(("127.0.0.1", port)).await?;
    client.send("RETR e.txt").await?;
    assert_eq!(read_all(data).await?, b"epsv");
    assert_eq!(client.reply().await?.0, 200);
    Ok(())
}

#[tokio::test]
async fn active_mode_retrieve() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("port.txt"), b"active")?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let mut client = server.login().await?;
    client.expect("PORT 127,0,0,1", 501).await?;
    client
        .expect(&format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff), 200)
        .await?;
    client.send("RETR port.txt").await?;

    let (data, _) = listener.accept().await?;
    assert_eq!(read_all(data).await?, b"active");
    assert_eq!(client.reply().await?.0, 200);

    let port = listener.local_addr()?.port();
    client
        .expect(&format!("EPRT |1|127.0.0.1|{}|", port), 200)
        .await?;
    client.send("RETR port.txt").await?;
    let (data, _) = listener.accept().await?;
    assert_eq!(read_all(data).await?, b"active");
    assert_eq!(client.reply().await?.0, 200);
    Ok(())
}

#[tokio::test]
async fn abort_with_nothing_pending() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.login().await?;

    client.expect("ABOR", 226).await?;

    // A pending passive connection is released
    client.expect("PASV", 227).await?;
    client.expect("ABOR", 226).await?;
    client.expect("RETR anything", 425).await?;
    Ok(())
}

#[tokio::test]
async fn abort_while_waiting_for_data_connection() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("big.bin"), vec![7u8; 1024])?;

    let mut client = server.login().await?;
    client.expect("PASV", 227).await?;

    // Never connect: RETR blocks on the rendezvous until ABOR arrives
    client.send("RETR big.bin").await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.send("ABOR").await?;

    assert_eq!(client.reply().await?.0, 426);
    assert_eq!(client.reply().await?.0, 226);
    client.expect("NOOP", 200).await?;
    Ok(())
}

#[tokio::test]
async fn abort_during_retrieve() -> Result<()> {
    let server = TestServer::start().await?;
    let payload = vec![3u8; 32 * 1024 * 1024];
    std::fs::write(server.alice_path("large.bin"), &payload)?;

    let mut client = server.login().await?;
    let data = client.pasv().await?;
    client.send("RETR large.bin").await?;

    // The data socket is never read, so the copy stalls on a full buffer
    tokio::time::sleep(Duration::from_millis(200)).await;
    client.send("ABOR").await?;

    assert_eq!(client.reply().await?.0, 426);
    assert_eq!(client.reply().await?.0, 226);
    drop(data);
    client.expect("NOOP", 200).await?;
    Ok(())
}

#[tokio::test]
async fn abort_during_store_leaves_no_file() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.login().await?;

    let mut data = client.pasv().await?;
    client.send("STOR partial.bin").await?;
    data.write_all(&[9u8; 4096]).await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    client.send("ABOR").await?;

    assert_eq!(client.reply().await?.0, 426);
    assert_eq!(client.reply().await?.0, 226);
    assert!(!server.alice_path("partial.bin").exists());
    drop(data);
    client.expect("NOOP", 200).await?;
    Ok(())
}

#[tokio::test]
async fn commands_queued_during_transfer_run_in_order() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.login().await?;

    let mut data = client.pasv().await?;
    client.send("STOR queued.txt").await?;
    client.send("NOOP").await?;
    client.send("PWD").await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    data.write_all(b"q").await?;
    drop(data);

    assert_eq!(client.reply().await?.0, 200);
    assert_eq!(client.reply().await?.0, 200);
    assert_eq!(client.reply().await?.0, 257);
    Ok(())
}

#[tokio::test]
async fn status_listing_over_control_connection() -> Result<()> {
    let server = TestServer::start().await?;
    std::fs::write(server.alice_path("s.txt"), b"stat")?;

    let mut client = server.login().await?;
    let (code, text) = client.command("STAT").await?;
    assert_eq!(code, 211);
    assert!(text.contains("alice"), "{}", text);

    let (code, text) = client.command("STAT s.txt").await?;
    assert_eq!(code, 211);
    assert!(text.contains("s.txt"), "{}", text);

    client.expect("STAT missing", 450).await?;
    Ok(())
}
