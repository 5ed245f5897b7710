use bytes::BytesMut;
use sunflower_transport::ByteChannel;
use tracing::trace;

use crate::codec::{encode_frame, Frame, FRAME_SIZE};
use crate::error::Result;

/// Writes complete frames to any [`ByteChannel`].
pub struct FrameWriter<C> {
    inner: C,
    buf: BytesMut,
}

impl<C: ByteChannel> FrameWriter<C> {
    /// Create a new frame writer.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(FRAME_SIZE),
        }
    }

    /// Write a complete frame and flush it to the wire.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.buf.clear();
        encode_frame(frame, &mut self.buf);
        trace!(frame = %frame, "writing frame");
        self.inner.write_all(&self.buf)?;
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sunflower_transport::{MemoryChannel, TransportError};

    use super::*;
    use crate::codec::decode;
    use crate::command::Command;
    use crate::error::FrameError;
    use crate::reader::FrameReader;

    fn read_all(channel: &mut MemoryChannel) -> Vec<u8> {
        let mut buf = vec![0u8; channel.bytes_available().unwrap()];
        let n = channel.read(&mut buf).unwrap();
        buf.truncate(n);
        buf
    }

    #[test]
    fn write_single_frame() {
        let (host, mut device) = MemoryChannel::pair();
        let mut writer = FrameWriter::new(host);

        writer
            .write_frame(&Frame::new(Command::GetState, 0))
            .unwrap();

        let bytes = read_all(&mut device);
        assert_eq!(bytes.len(), FRAME_SIZE);
        assert_eq!(decode(&bytes).unwrap().command(), Some(Command::GetState));
    }

    #[test]
    fn write_multiple_frames_in_order() {
        let (host, mut device) = MemoryChannel::pair();
        let mut writer = FrameWriter::new(host);

        for (command, data) in [
            (Command::HaltTracking, 0),
            (Command::SetMotorL, 120),
            (Command::SetMotorR, 80),
            (Command::StartTracking, 0),
        ] {
            writer.write_frame(&Frame::new(command, data)).unwrap();
        }

        let mut reader = FrameReader::new();
        reader.extend(&read_all(&mut device));
        let frames = reader.drain_frames();
        let commands: Vec<_> = frames.iter().filter_map(|f| f.command()).collect();
        assert_eq!(
            commands,
            vec![
                Command::HaltTracking,
                Command::SetMotorL,
                Command::SetMotorR,
                Command::StartTracking
            ]
        );
        assert_eq!(frames[1].data, 120);
        assert_eq!(frames[2].data, 80);
    }

    #[test]
    fn write_after_close_fails() {
        let (host, mut device) = MemoryChannel::pair();
        let mut writer = FrameWriter::new(host);
        device.close().unwrap();

        let err = writer
            .write_frame(&Frame::new(Command::Stop, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::Transport(TransportError::Shutdown)
        ));
    }

    #[test]
    fn each_write_is_one_whole_frame() {
        let (host, mut device) = MemoryChannel::pair();
        let mut writer = FrameWriter::new(host);

        writer
            .write_frame(&Frame::new(Command::SetMotorL, 0xFFFF_FFCE))
            .unwrap();
        writer.write_frame(&Frame::new(Command::Stop, 0)).unwrap();

        let bytes = read_all(&mut device);
        assert_eq!(bytes.len(), 2 * FRAME_SIZE);
        let second = decode(&bytes[FRAME_SIZE..]).unwrap();
        assert_eq!(second.command(), Some(Command::Stop));
        assert_eq!(decode(&bytes[..FRAME_SIZE]).unwrap().data as i32, -50);
    }
}
