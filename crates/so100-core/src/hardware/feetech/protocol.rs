//! Feetech STS/SCS servo protocol implementation
//!
//! The SO-100 uses Feetech STS3215 servos which follow a Dynamixel-like protocol.
//!
//! Instruction packet: [0xFF, 0xFF, ID, Length, Instruction, Params..., Checksum]
//! Status packet:      [0xFF, 0xFF, ID, Length, Error, Params..., Checksum]

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;

use crate::{Error, Result};

/// Feetech instruction codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Ping = 0x01,
    Read = 0x02,
    Write = 0x03,
}

/// Broadcast ID, never answered and never a valid servo id
pub const BROADCAST_ID: u8 = 0xFE;

/// Largest register payload the console ever moves
pub const MAX_DATA: usize = 8;

const HEADER: [u8; 2] = [0xFF, 0xFF];

/// Serial protocol handler for Feetech servos
pub struct FeetechProtocol<S> {
    serial: S,
    timeout: Duration,
}

impl<S> FeetechProtocol<S>
where
    S: Read + Write,
{
    /// Create a new protocol handler
    pub fn new(serial: S, timeout: Duration) -> Self {
        Self { serial, timeout }
    }

    /// Give back the underlying serial port
    pub fn into_inner(self) -> S {
        self.serial
    }

    /// Checksum over id, length, instruction/error and params
    pub(crate) fn checksum(id: u8, length: u8, code: u8, params: &[u8]) -> u8 {
        !params.iter().fold(
            id.wrapping_add(length).wrapping_add(code),
            |acc, &p| acc.wrapping_add(p),
        )
    }

    /// Build an instruction packet
    pub(crate) fn build_packet(
        id: u8,
        instruction: Instruction,
        params: &[u8],
    ) -> Result<ArrayVec<u8, 32>> {
        let mut packet = ArrayVec::<u8, 32>::new();
        let length = u8::try_from(params.len() + 2)
            .map_err(|_| Error::Hardware("Packet params too long".into()))?;
        packet.extend(HEADER);
        packet.push(id);
        packet.push(length);
        packet.push(instruction as u8);
        packet
            .try_extend_from_slice(params)
            .map_err(|_| Error::Hardware(format!("{} packet params exceed buffer", params.len())))?;
        packet.push(Self::checksum(id, length, instruction as u8, params));
        Ok(packet)
    }

    /// Send an instruction and return the params of the status packet
    fn transact(
        &mut self,
        id: u8,
        instruction: Instruction,
        params: &[u8],
    ) -> Result<ArrayVec<u8, MAX_DATA>> {
        let packet = Self::build_packet(id, instruction, params)?;

        // Drop stale bytes from an earlier timed-out exchange
        self.flush_input();

        self.serial
            .write_all(&packet)
            .map_err(|e| Error::Hardware(format!("Failed to write packet: {}", e)))?;
        tracing::trace!(id, ?instruction, "Sent {:02X?}", packet.as_slice());

        let mut header = [0u8; 4];
        self.read_exact(&mut header)?;
        if header[..2] != HEADER {
            return Err(Error::Hardware("Invalid response header".into()));
        }
        if header[2] != id {
            return Err(Error::Hardware(format!(
                "Response from servo {} while talking to servo {}",
                header[2], id
            )));
        }

        // Length counts the error byte and the checksum
        let length = header[3] as usize;
        if !(2..=MAX_DATA + 2).contains(&length) {
            return Err(Error::Hardware(format!(
                "Invalid response length {}",
                length
            )));
        }
        let mut body = [0u8; MAX_DATA + 2];
        self.read_exact(&mut body[..length])?;

        let error = body[0];
        let data = &body[1..length - 1];
        let expected = Self::checksum(id, header[3], error, data);
        if body[length - 1] != expected {
            return Err(Error::Hardware(format!(
                "Checksum mismatch from servo {}: got 0x{:02X}, expected 0x{:02X}",
                id,
                body[length - 1],
                expected
            )));
        }
        if error != 0 {
            return Err(Error::Hardware(format!(
                "Servo {} error: 0x{:02X}",
                id, error
            )));
        }

        let mut result = ArrayVec::new();
        // Bounded by the length check above
        result.try_extend_from_slice(data).map_err(|_| {
            Error::Hardware(format!("Response of {} bytes exceeds buffer", data.len()))
        })?;
        Ok(result)
    }

    /// Read exact number of bytes with timeout handling
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut total_read = 0;
        let start = Instant::now();

        while total_read < buf.len() {
            if start.elapsed() > self.timeout {
                return Err(Error::Timeout(format!(
                    "got {} of {} bytes",
                    total_read,
                    buf.len()
                )));
            }

            match self.serial.read(&mut buf[total_read..]) {
                Ok(0) => std::thread::sleep(Duration::from_micros(100)),
                Ok(n) => total_read += n,
                Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::Interrupted => {
                    continue
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_micros(100));
                }
                Err(e) => return Err(Error::Hardware(format!("Read error: {}", e))),
            }
        }

        Ok(())
    }

    /// Flush input buffer
    fn flush_input(&mut self) {
        let mut scratch = [0u8; 64];
        while self.serial.read(&mut scratch).is_ok_and(|n| n > 0) {}
    }

    /// Ping a servo to check if it's alive
    pub fn ping(&mut self, id: u8) -> bool {
        self.transact(id, Instruction::Ping, &[]).is_ok()
    }

    /// Read `length` bytes starting at `address`
    pub fn read_register(
        &mut self,
        id: u8,
        address: u8,
        length: u8,
    ) -> Result<ArrayVec<u8, MAX_DATA>> {
        let data = self.transact(id, Instruction::Read, &[address, length])?;
        if data.len() != length as usize {
            return Err(Error::Hardware(format!(
                "Servo {} returned {} bytes, expected {}",
                id,
                data.len(),
                length
            )));
        }
        Ok(data)
    }

    /// Write `data` starting at `address`
    pub fn write_register(&mut self, id: u8, address: u8, data: &[u8]) -> Result<()> {
        let mut params = ArrayVec::<u8, { MAX_DATA + 1 }>::new();
        params.push(address);
        params
            .try_extend_from_slice(data)
            .map_err(|_| Error::Hardware(format!("{} bytes exceed register write", data.len())))?;
        self.transact(id, Instruction::Write, &params)?;
        Ok(())
    }
}
