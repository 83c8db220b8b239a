use crate::link::{FrameTransmitter, FrameTrash, HostForward};
use arp_rs_packets::EthernetFrame;
use std::io::{BufWriter, Write};

/// Collaborator adapter that logs frames with Debug information, delimited
/// with newlines, before handing them to the wrapped sink.
pub struct LogSink<S, W: Write> {
    inner: S,
    log_writer: BufWriter<W>,
}

impl<S, W: Write> LogSink<S, W> {
    pub fn new(inner: S, writer: W) -> LogSink<S, W> {
        LogSink {
            inner,
            log_writer: BufWriter::new(writer),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn log(&mut self, frame: &EthernetFrame) {
        self.log_writer
            .write_all(format!("{:?}\n", frame).as_ref())
            .unwrap();
    }
}

/// "It is critical to call flush before BufWriter<W> is dropped.
/// Though dropping will attempt to flush the the contents of the buffer, any
/// errors that happen in the process of dropping will be ignored. Calling
/// flush ensures that the buffer is empty and thus dropping will not even
/// attempt file operations."
/// https://doc.rust-lang.org/std/io/struct.BufWriter.html
impl<S, W: Write> Drop for LogSink<S, W> {
    fn drop(&mut self) {
        self.log_writer.flush().unwrap();
    }
}

impl<S: FrameTransmitter, W: Write> FrameTransmitter for LogSink<S, W> {
    fn transmit(&mut self, frame: EthernetFrame) {
        self.log(&frame);
        self.inner.transmit(frame);
    }
}

impl<S: HostForward, W: Write> HostForward for LogSink<S, W> {
    fn forward(&mut self, frame: EthernetFrame) {
        self.log(&frame);
        self.inner.forward(frame);
    }
}

impl<S: FrameTrash, W: Write> FrameTrash for LogSink<S, W> {
    fn trash(&mut self, frame: EthernetFrame) {
        self.log(&frame);
        self.inner.trash(frame);
    }
}
