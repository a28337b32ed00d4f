// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Message exchange between two players on different machines.
//!
//! Peers exchange [`Message`]s encoded as JSON objects, one per line:
//!
//! ```text
//! {"type":"START"}
//! {"type":"MOVE","move":{"start":{"r":6,"c":3},"end":{"r":5,"c":3}}}
//! ```
//!
//! The host plays [`Side::Second`], so it makes the first move, and sends `START` as
//! soon as a peer connects. The joiner plays [`Side::First`] and waits for `START`
//! before doing anything else. After that each side sends exactly one `MOVE` per turn.
//! Moves received from the peer are trusted and are not checked against the movement
//! rules.

use std::{
    fmt,
    io::{self, BufRead, BufReader, Write},
    net::TcpStream,
    sync::mpsc::{self, Receiver, Sender},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Move, Side};

/// A message sent between peers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// The sender moved a piece.
    Move {
        #[serde(rename = "move")]
        mv: Move,
    },
    /// The host is ready and the game begins.
    Start,
}

impl From<Move> for Message {
    fn from(mv: Move) -> Self {
        Message::Move { mv }
    }
}

/// Error returned when exchanging messages failed.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Reading from or writing to the underlying stream failed.
    #[error("channel i/o failed: {0}")]
    Io(#[from] io::Error),

    /// A message could not be encoded, or a received line was not a valid message.
    #[error("malformed message: {0}")]
    Codec(#[from] serde_json::Error),

    /// The peer went away.
    #[error("peer disconnected")]
    Closed,
}

/// A bidirectional, ordered stream of messages to and from one peer.
pub trait Channel {
    /// Send a message to the peer.
    fn send(&mut self, message: &Message) -> Result<(), ChannelError>;

    /// Block until the next message arrives. Returns `Ok(None)` once the peer has closed
    /// the channel.
    fn recv(&mut self) -> Result<Option<Message>, ChannelError>;

    /// Iterate over received messages until the peer closes the channel. The iterator
    /// reads lazily; dropping it and calling `incoming` again resumes where it stopped.
    fn incoming(&mut self) -> Incoming<'_, Self>
    where
        Self: Sized,
    {
        Incoming { channel: self }
    }
}

/// Iterator over the messages of a [`Channel`]. Created by [`Channel::incoming`].
pub struct Incoming<'a, C: ?Sized> {
    channel: &'a mut C,
}

impl<'a, C: Channel + ?Sized> Iterator for Incoming<'a, C> {
    type Item = Result<Message, ChannelError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.channel.recv().transpose()
    }
}

/// A [`Channel`] that writes one JSON message per line and reads the same format.
#[derive(Debug)]
pub struct JsonLinesChannel<R, W> {
    reader: R,
    writer: W,
    /// Buffer for the line being read.
    line: String,
}

impl<R: BufRead, W: Write> JsonLinesChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    /// Extract the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl JsonLinesChannel<BufReader<TcpStream>, TcpStream> {
    /// Exchange messages over a connected TCP stream.
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self::new(reader, stream))
    }
}

impl<R: BufRead, W: Write> Channel for JsonLinesChannel<R, W> {
    fn send(&mut self, message: &Message) -> Result<(), ChannelError> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn recv(&mut self) -> Result<Option<Message>, ChannelError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let line = self.line.trim();
            if !line.is_empty() {
                return Ok(Some(serde_json::from_str(line)?));
            }
        }
    }
}

/// One end of an in-process [`Channel`]. Created in connected pairs by
/// [`memory_pair`].
#[derive(Debug)]
pub struct MemoryChannel {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

/// Create two connected in-process channels. Messages sent on one are received on the
/// other, in order.
pub fn memory_pair() -> (MemoryChannel, MemoryChannel) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (
        MemoryChannel { tx: a_tx, rx: a_rx },
        MemoryChannel { tx: b_tx, rx: b_rx },
    )
}

impl Channel for MemoryChannel {
    fn send(&mut self, message: &Message) -> Result<(), ChannelError> {
        self.tx.send(*message).map_err(|_| ChannelError::Closed)
    }

    fn recv(&mut self) -> Result<Option<Message>, ChannelError> {
        Ok(self.rx.recv().ok())
    }
}

/// What a received message means to the local player.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PeerEvent {
    /// The game started and the local player controls the given side.
    RoleAssigned(Side),
    /// The peer played a move.
    MoveReceived(Move),
}

/// Which end of the connection the local player is on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Role {
    /// Listened for the connection.
    Host,
    /// Connected to a host.
    Joiner,
}

impl Role {
    /// Side the local player controls.
    pub fn side(self) -> Side {
        match self {
            Role::Host => Side::Second,
            Role::Joiner => Side::First,
        }
    }

    /// Translate a received message. Returns `None` for messages that mean nothing in
    /// this role.
    pub fn interpret(self, message: Message) -> Option<PeerEvent> {
        match (self, message) {
            (_, Message::Move { mv }) => Some(PeerEvent::MoveReceived(mv)),
            (Role::Joiner, Message::Start) => Some(PeerEvent::RoleAssigned(self.side())),
            (Role::Host, Message::Start) => {
                log::warn!("ignoring START sent to the host");
                None
            }
        }
    }

    /// Begin the game on a freshly connected channel and return the local side. The host
    /// sends `START`; the joiner waits for it, discarding anything else.
    pub fn handshake<C: Channel + ?Sized>(self, channel: &mut C) -> Result<Side, ChannelError> {
        match self {
            Role::Host => channel.send(&Message::Start)?,
            Role::Joiner => loop {
                let message = channel.recv()?.ok_or(ChannelError::Closed)?;
                match self.interpret(message) {
                    Some(PeerEvent::RoleAssigned(_)) => break,
                    _ => log::warn!("ignoring {:?} before START", message),
                }
            },
        }
        log::info!("connected as {}, playing {}", self, self.side());
        Ok(self.side())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Role::Host => "host",
            Role::Joiner => "joiner",
        })
    }
}
