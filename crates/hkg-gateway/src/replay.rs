//! candump log playback.
//!
//! Lines look like `(1436509052.249713) can0 251#9C20407F96EA167B`. The
//! interface name is mapped to a bus through [`ChannelMap`]: `rx` names
//! become received frames, `tx` names become autopilot transmit requests,
//! anything else is skipped.

use async_trait::async_trait;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

use hkg_safety::Frame;

use crate::config::ChannelMap;
use crate::error::{GatewayError, GatewayResult};
use crate::interface::{BusEvent, CanInterface};

// (TIMESTAMP) IFACE ID#DATA
static RE_CANDUMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((\d+(?:\.\d+)?)\)\s+(\S+)\s+([0-9A-Fa-f]{1,8})#([0-9A-Fa-f]*)$").unwrap()
});

fn parse_error(line_number: usize, reason: impl Into<String>) -> GatewayError {
    GatewayError::Parse {
        line_number,
        reason: reason.into(),
    }
}

/// Turn candump hex data into bytes; at most 8 bytes.
fn candump_hex_to_bytes(hex: &str, line_number: usize) -> GatewayResult<([u8; 8], usize)> {
    if !hex.is_ascii() {
        return Err(parse_error(line_number, "non-ASCII data field"));
    }
    if hex.len() % 2 != 0 {
        return Err(parse_error(line_number, "odd number of hex digits"));
    }
    let len = hex.len() / 2;
    if len > 8 {
        return Err(parse_error(line_number, format!("{len} data bytes exceed 8")));
    }
    let mut data = [0u8; 8];
    for (i, byte) in data.iter_mut().take(len).enumerate() {
        *byte = u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
            .map_err(|e| parse_error(line_number, e.to_string()))?;
    }
    Ok((data, len))
}

/// Parse one candump line. Blank lines, `#` comments and unmapped interfaces
/// yield `Ok(None)`.
pub fn parse_candump_line(line: &str, line_number: usize, channels: &ChannelMap) -> GatewayResult<Option<BusEvent>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let caps = RE_CANDUMP
        .captures(line)
        .ok_or_else(|| parse_error(line_number, "not a candump line"))?;

    let iface = &caps[2];
    let id = u32::from_str_radix(&caps[3], 16).map_err(|e| parse_error(line_number, e.to_string()))?;
    let (data, len) = candump_hex_to_bytes(&caps[4], line_number)?;

    if let Some(&bus) = channels.rx.get(iface) {
        let frame = Frame::new(bus, id, &data[..len])?;
        Ok(Some(BusEvent::Received(frame)))
    } else if let Some(&bus) = channels.tx.get(iface) {
        let frame = Frame::new(bus, id, &data[..len])?;
        Ok(Some(BusEvent::TransmitRequest(frame)))
    } else {
        tracing::debug!(line_number, iface, "skipping unmapped interface");
        Ok(None)
    }
}

/// Replays a parsed candump log and records what the gateway sends.
pub struct ReplayCanInterface {
    events: Mutex<VecDeque<BusEvent>>,
    sent_frames: Mutex<Vec<Frame>>,
}

impl ReplayCanInterface {
    /// Parse a whole log. Fails on the first malformed line.
    pub fn from_log(contents: &str, channels: &ChannelMap) -> GatewayResult<Self> {
        let mut events = VecDeque::new();
        for (i, line) in contents.lines().enumerate() {
            if let Some(event) = parse_candump_line(line, i + 1, channels)? {
                events.push_back(event);
            }
        }
        Ok(Self {
            events: Mutex::new(events),
            sent_frames: Mutex::new(Vec::new()),
        })
    }

    /// Load and parse a log file.
    pub fn from_file(path: &str, channels: &ChannelMap) -> GatewayResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_log(&contents, channels)
    }

    /// Events not yet consumed.
    pub fn remaining(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn sent_frames(&self) -> Vec<Frame> {
        self.sent_frames.lock().unwrap().clone()
    }
}

#[async_trait]
impl CanInterface for ReplayCanInterface {
    async fn send_frame(&self, frame: &Frame) -> GatewayResult<()> {
        self.sent_frames.lock().unwrap().push(*frame);
        Ok(())
    }

    async fn recv_event(&self, _timeout: Duration) -> GatewayResult<BusEvent> {
        let next = self.events.lock().unwrap().pop_front();
        next.ok_or(GatewayError::EndOfStream)
    }
}
