//! Update stream transport.
//!
//! The server broadcasts one length-prefixed frame per tick (`u32` LE
//! length, then the payload). A reader thread owns the socket and pushes
//! complete frames into a channel; the engine drains the channel on its own
//! cadence and never blocks on the network. Decode and delivery stay
//! decoupled: a slow tick just queues frames.

use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Receiving end of the update stream.
pub struct UpdateFeed {
    receiver: Receiver<Vec<u8>>,
}

impl UpdateFeed {
    /// Next queued frame, if any. Never blocks.
    pub fn poll(&self) -> Option<Vec<u8>> {
        self.receiver.try_recv().ok()
    }

    /// Every frame queued so far, oldest first.
    pub fn drain(&self) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.receiver.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

/// Connect to the update stream and spawn the reader thread.
pub fn connect_update_feed(addr: SocketAddr) -> io::Result<UpdateFeed> {
    let stream = TcpStream::connect(addr)?;
    if let Err(err) = stream.set_nodelay(true) {
        log::warn!("failed to set TCP_NODELAY on update feed: {}", err);
    }
    log::info!("update feed connected to {}", addr);

    let (sender, receiver) = unbounded::<Vec<u8>>();
    thread::spawn(move || read_frames(stream, sender));

    Ok(UpdateFeed { receiver })
}

fn read_frames(mut stream: TcpStream, sender: Sender<Vec<u8>>) {
    loop {
        let mut len_buf = [0u8; 4];
        if let Err(err) = stream.read_exact(&mut len_buf) {
            log::info!("update feed closed: {}", err);
            break;
        }
        let len = u32::from_le_bytes(len_buf) as usize;
        let mut frame = vec![0u8; len];
        if let Err(err) = stream.read_exact(&mut frame) {
            log::warn!("update feed truncated mid-frame: {}", err);
            break;
        }
        if sender.send(frame).is_err() {
            // Engine side dropped the feed.
            break;
        }
    }
}
