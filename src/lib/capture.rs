//! Serializes CSI samples handed over by the radio driver.

use core::fmt::{self, Write};

use crate::config::CsiCaptureConfig;
use crate::error::Result;

/// Label that starts every emitted line.
pub const CSI_LINE_PREFIX: &str = "CSI_DATA: ";

/// Raw CSI buffer lent by the driver for the duration of one callback.
#[derive(Debug, Clone, Copy)]
pub struct CsiSample<'a, V = i8> {
    values: &'a [V],
}

impl<'a, V> CsiSample<'a, V> {
    pub fn new(values: &'a [V]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &'a [V] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> CsiSample<'a, i8> {
    /// Borrows a driver owned buffer.
    ///
    /// A null `buf` yields an empty sample.
    ///
    /// # Safety
    /// A non-null `buf` must point to `len` initialized bytes that stay valid and
    /// unmodified for `'a`.
    pub unsafe fn from_raw_parts(buf: *const i8, len: usize) -> Self {
        if buf.is_null() {
            return Self { values: &[] };
        }
        Self {
            values: core::slice::from_raw_parts(buf, len),
        }
    }
}

/// Writes one text line per CSI sample to its sink.
///
/// Line format: `CSI_DATA: ` followed by the decimal value of each entry,
/// separated by single spaces, terminated by `\n`. The emitter holds no state
/// besides the sink and never retains a sample.
#[derive(Debug, Clone)]
pub struct CaptureEmitter<W> {
    sink: W,
}

impl<W: Write> CaptureEmitter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn on_csi_sample<V: fmt::Display>(&mut self, sample: CsiSample<'_, V>) -> fmt::Result {
        self.sink.write_str(CSI_LINE_PREFIX)?;
        let mut values = sample.values().iter();
        if let Some(first) = values.next() {
            write!(self.sink, "{}", first)?;
            for value in values {
                write!(self.sink, " {}", value)?;
            }
        }
        self.sink.write_char('\n')
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}

/// Capture side of the radio driver.
pub trait CaptureRadio {
    /// Sink type of the emitter the radio hands samples to.
    type Sink: Write;

    fn set_capture_config(&mut self, config: &CsiCaptureConfig) -> Result<()>;

    /// Makes `emitter` the only receiver of subsequent samples, replacing any previous one.
    fn register_capture_callback(&mut self, emitter: CaptureEmitter<Self::Sink>) -> Result<()>;

    fn set_capture_enabled(&mut self, enabled: bool) -> Result<()>;
}

/// Installs `config` on the radio and routes every captured sample to `emitter`.
///
/// Capture stays off until [`CaptureRadio::set_capture_enabled`] is called.
/// Registering again with the same arguments leaves the radio as it was.
pub fn register<R: CaptureRadio>(
    radio: &mut R,
    config: &CsiCaptureConfig,
    emitter: CaptureEmitter<R::Sink>,
) -> Result<()> {
    radio.set_capture_config(config)?;
    radio.register_capture_callback(emitter)
}
