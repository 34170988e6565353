//! The relay is deliberately dumb: every newline-delimited text frame a peer
//! sends is forwarded verbatim to every other connected peer. It never parses
//! game messages and holds no game state; all authority lives in the peers.

use std::net::SocketAddr;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

pub async fn run(bind_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    let (tx, _) = broadcast::channel::<(SocketAddr, String)>(CHANNEL_CAPACITY);

    loop {
        let (stream, addr) = listener.accept().await?;
        log::info!("peer connected from {addr}");

        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_peer(stream, addr, tx).await {
                log::debug!("peer {addr} errored: {err}");
            }
            log::info!("peer {addr} disconnected");
        });
    }
}

async fn handle_peer(
    stream: TcpStream,
    addr: SocketAddr,
    tx: broadcast::Sender<(SocketAddr, String)>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut rx = tx.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(frame) => {
                        // Forwarded as-is; peers deal with malformed frames.
                        let _ = tx.send((addr, frame));
                    }
                    None => break,
                }
            }
            forwarded = rx.recv() => {
                match forwarded {
                    Ok((from, frame)) if from != addr => {
                        writer.write_all(frame.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    Ok(_) => {}
                    // A slow peer that lagged off the end of the buffer just
                    // misses those frames, like any lossy link.
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        log::warn!("peer {addr} lagged, dropped {missed} frames");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
    Ok(())
}
