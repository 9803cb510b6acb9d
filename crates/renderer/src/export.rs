//! Frame sinks for animated export, and the JSON polyline dump.
//!
//! The contour pipeline hands finished RGBA frames to a [`FrameSink`]
//! without knowing the target format:
//! - [`PngSequenceSink`]: numbered PNG files in a directory
//! - [`GifSink`]: one looping animated GIF

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use topo_common::{Contour, TopoError, TopoResult};

use crate::png::create_png_auto;

/// Default frame delay for animated output (roughly 30 fps).
pub const DEFAULT_FRAME_DELAY_MS: u32 = 33;

/// Consumer of rendered animation frames.
pub trait FrameSink {
    /// Append one straight-RGBA frame.
    fn push_frame(&mut self, rgba: &[u8], width: usize, height: usize) -> TopoResult<()>;

    /// Flush and close the output. Pushing after `finish` is an error.
    fn finish(&mut self) -> TopoResult<()>;

    /// Frames accepted so far.
    fn frames_written(&self) -> usize;
}

fn check_frame(rgba: &[u8], width: usize, height: usize) -> TopoResult<()> {
    if width == 0 || height == 0 || rgba.len() != width * height * 4 {
        return Err(TopoError::EncodeError(format!(
            "frame of {} bytes does not match {}x{} RGBA",
            rgba.len(),
            width,
            height
        )));
    }
    Ok(())
}

/// Writes `<prefix>_00000.png`, `<prefix>_00001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    count: usize,
    finished: bool,
}

impl PngSequenceSink {
    /// Create the sink, creating `dir` if needed.
    pub fn create(dir: impl AsRef<Path>, prefix: impl Into<String>) -> TopoResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            count: 0,
            finished: false,
        })
    }

    /// Path of the frame with the given index.
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}_{:05}.png", self.prefix, index))
    }
}

impl FrameSink for PngSequenceSink {
    fn push_frame(&mut self, rgba: &[u8], width: usize, height: usize) -> TopoResult<()> {
        if self.finished {
            return Err(TopoError::EncodeError("PNG sequence already finished".into()));
        }
        check_frame(rgba, width, height)?;

        let png = create_png_auto(rgba, width, height)?;
        let path = self.frame_path(self.count);
        fs::write(&path, png)?;
        tracing::debug!(path = %path.display(), frame = self.count, "Wrote PNG frame");

        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> TopoResult<()> {
        self.finished = true;
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.count
    }
}

/// Bytes produced by the GIF encoder, held until the sink copies them to the
/// destination writer. The encoder only ever sees this infallible buffer, so
/// write and flush failures surface from the sink instead of the encoder's drop.
#[derive(Clone, Default)]
struct StagingBuffer(Arc<Mutex<Vec<u8>>>);

impl StagingBuffer {
    fn take(&self) -> io::Result<Vec<u8>> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "GIF staging buffer poisoned"))?;
        Ok(std::mem::take(&mut *bytes))
    }
}

impl Write for StagingBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "GIF staging buffer poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Animated GIF encoder, looping forever.
///
/// Encoded bytes are copied to the writer after every frame; `finish` writes
/// the trailer and flushes, reporting any I/O failure.
pub struct GifSink<W: Write> {
    encoder: Option<GifEncoder<StagingBuffer>>,
    staging: StagingBuffer,
    writer: W,
    delay: Delay,
    count: usize,
}

impl GifSink<BufWriter<File>> {
    /// Create a GIF file at `path`.
    pub fn create(path: impl AsRef<Path>, delay_ms: u32) -> TopoResult<Self> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file), delay_ms)
    }
}

impl<W: Write> GifSink<W> {
    /// Wrap any writer. Every frame is shown for `delay_ms` milliseconds.
    pub fn new(writer: W, delay_ms: u32) -> TopoResult<Self> {
        let staging = StagingBuffer::default();
        // speed 10 is the encoder's balance of palette quality and time
        let mut encoder = GifEncoder::new_with_speed(staging.clone(), 10);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| TopoError::EncodeError(format!("GIF repeat: {}", e)))?;
        Ok(Self {
            encoder: Some(encoder),
            staging,
            writer,
            delay: Delay::from_numer_denom_ms(delay_ms, 1),
            count: 0,
        })
    }

    /// The destination writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Copy staged encoder output to the destination writer.
    fn drain(&mut self) -> TopoResult<()> {
        let bytes = self.staging.take()?;
        if !bytes.is_empty() {
            self.writer.write_all(&bytes)?;
        }
        Ok(())
    }
}

impl<W: Write> FrameSink for GifSink<W> {
    fn push_frame(&mut self, rgba: &[u8], width: usize, height: usize) -> TopoResult<()> {
        check_frame(rgba, width, height)?;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| TopoError::EncodeError("GIF already finished".into()))?;

        let buffer = RgbaImage::from_raw(width as u32, height as u32, rgba.to_vec())
            .ok_or_else(|| TopoError::EncodeError("frame buffer size mismatch".into()))?;
        encoder
            .encode_frame(Frame::from_parts(buffer, 0, 0, self.delay))
            .map_err(|e| TopoError::EncodeError(format!("GIF frame {}: {}", self.count, e)))?;

        self.drain()?;
        self.count += 1;
        Ok(())
    }

    fn finish(&mut self) -> TopoResult<()> {
        let Some(encoder) = self.encoder.take() else {
            return Ok(());
        };
        // Dropping the encoder stages the GIF trailer
        drop(encoder);
        self.drain()?;
        self.writer.flush()?;

        tracing::debug!(frames = self.count, "Finished GIF");
        Ok(())
    }

    fn frames_written(&self) -> usize {
        self.count
    }
}

/// Serialize contours as a JSON array of `{level_index, level, polyline}`.
pub fn contours_to_json(contours: &[Contour]) -> TopoResult<String> {
    Ok(serde_json::to_string_pretty(contours)?)
}
