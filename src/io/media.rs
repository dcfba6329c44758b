// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media frame decoding and the background worker that serves seeks.
//!
//! A `FrameDecoder` turns a media resource into rasterized frames. The
//! worker owns a decoder on its own thread and answers seek requests over
//! channels: one frame event per seek, delivered in request order.

use crate::models::stepper::VideoMetadata;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

/// A rasterized frame ready for texture upload (RGBA, row-major).
#[derive(Debug)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Source of rasterized frames for one loaded media resource.
pub trait FrameDecoder {
    /// Dimensions and duration of the loaded resource.
    fn metadata(&self) -> VideoMetadata;

    /// Rasterize the frame at `timestamp` seconds.
    fn decode_at(&mut self, timestamp: f64) -> Result<FrameImage>;
}

/// A media resource the worker can open.
#[derive(Debug, Clone)]
pub enum MediaResource {
    /// A video file, decoded with OpenCV (`video-opencv` feature).
    Video(PathBuf),
    /// A directory of image files played as a sequence at the nominal rate.
    ImageSequence(PathBuf),
}

impl MediaResource {
    /// Short name for display and export.
    pub fn display_name(&self) -> String {
        let path = match self {
            MediaResource::Video(path) | MediaResource::ImageSequence(path) => path,
        };
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Request to the media worker.
#[derive(Debug)]
pub enum MediaRequest {
    /// Decode the frame at this timestamp (seconds) and report it.
    Seek(f64),
}

/// Notification from the media worker.
#[derive(Debug)]
pub enum MediaEvent {
    /// The resource is decodable; dimensions and duration are known.
    MetadataLoaded(VideoMetadata),
    /// One rasterized frame, answering one seek request.
    FrameReady { timestamp: f64, image: FrameImage },
    /// Opening the resource or decoding a frame failed.
    Failed(String),
}

/// Channel pair connecting the application to a media worker thread.
///
/// Dropping the handle closes the request channel and ends the worker.
pub struct MediaHandle {
    requests: Sender<MediaRequest>,
    events: Receiver<MediaEvent>,
}

impl MediaHandle {
    /// Ask the worker to rasterize the frame at `timestamp`.
    pub fn seek(&self, timestamp: f64) {
        // A failed send means the worker exited; its Failed event is
        // already queued for the next poll.
        let _ = self.requests.send(MediaRequest::Seek(timestamp));
    }

    /// Next pending event, if any. Never blocks.
    pub fn poll(&self) -> Option<MediaEvent> {
        self.events.try_recv().ok()
    }
}

/// Spawn a worker thread that opens `resource` and serves seek requests.
///
/// The worker sends `MetadataLoaded` (or `Failed`) first, then exactly one
/// `FrameReady` or `Failed` per received seek, in request order.
pub fn spawn_media_worker(resource: MediaResource, nominal_rate: f64) -> MediaHandle {
    let (request_tx, request_rx) = channel();
    let (event_tx, event_rx) = channel();

    std::thread::spawn(move || match open_decoder(&resource, nominal_rate) {
        Ok(decoder) => {
            let metadata = decoder.metadata();
            log::info!(
                "Opened {}: {}x{}, {:.2}s",
                resource.display_name(),
                metadata.width,
                metadata.height,
                metadata.duration
            );
            serve_frames(decoder, &request_rx, &event_tx);
        }
        Err(e) => {
            log::error!("Failed to open {}: {:#}", resource.display_name(), e);
            let _ = event_tx.send(MediaEvent::Failed(format!("{:#}", e)));
        }
    });

    MediaHandle {
        requests: request_tx,
        events: event_rx,
    }
}

/// Worker loop: metadata first, then one frame event per seek, in order.
/// Returns when the request channel closes. A failed decode reports the
/// error and keeps serving later seeks.
fn serve_frames(
    mut decoder: Box<dyn FrameDecoder>,
    requests: &Receiver<MediaRequest>,
    events: &Sender<MediaEvent>,
) {
    let _ = events.send(MediaEvent::MetadataLoaded(decoder.metadata()));

    while let Ok(MediaRequest::Seek(timestamp)) = requests.recv() {
        match decoder.decode_at(timestamp) {
            Ok(image) => {
                log::debug!("Decoded frame at {:.3}s", timestamp);
                let _ = events.send(MediaEvent::FrameReady { timestamp, image });
            }
            Err(e) => {
                log::error!("Decode at {:.3}s failed: {:#}", timestamp, e);
                let _ = events.send(MediaEvent::Failed(format!("{:#}", e)));
            }
        }
    }
}

fn open_decoder(resource: &MediaResource, nominal_rate: f64) -> Result<Box<dyn FrameDecoder>> {
    match resource {
        MediaResource::ImageSequence(dir) => {
            Ok(Box::new(ImageSequenceDecoder::open(dir, nominal_rate)?))
        }
        #[cfg(feature = "video-opencv")]
        MediaResource::Video(path) => Ok(Box::new(OpenCvVideoDecoder::open(path)?)),
        #[cfg(not(feature = "video-opencv"))]
        MediaResource::Video(path) => {
            bail!(
                "video decoding requires the video-opencv feature (cannot open {})",
                path.display()
            )
        }
    }
}

/// Plays a directory of image files as consecutive frames at a nominal rate.
///
/// Files are ordered by name, so numbered sequences should be zero-padded.
/// The frame for a timestamp is `round(timestamp * rate)`, clamped to the
/// last file; the duration is `count / rate`.
pub struct ImageSequenceDecoder {
    frames: Vec<PathBuf>,
    frame_rate: f64,
    metadata: VideoMetadata,
}

impl ImageSequenceDecoder {
    /// Build a sequence from every image file in `dir`, sorted by name.
    pub fn open(dir: &Path, nominal_rate: f64) -> Result<Self> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image_file(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            bail!("no image files in {}", dir.display());
        }

        // Frame size comes from the first image; later frames are assumed
        // to match.
        let first = load_frame(&frames[0])?;
        let metadata = VideoMetadata {
            width: first.width,
            height: first.height,
            duration: frames.len() as f64 / nominal_rate,
        };

        Ok(Self {
            frames,
            frame_rate: nominal_rate,
            metadata,
        })
    }
}

impl FrameDecoder for ImageSequenceDecoder {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn decode_at(&mut self, timestamp: f64) -> Result<FrameImage> {
        let index = frame_index_at(timestamp, self.frame_rate, self.frames.len());
        load_frame(&self.frames[index])
    }
}

/// Index of the sequence frame covering `timestamp` at `frame_rate`.
fn frame_index_at(timestamp: f64, frame_rate: f64, frame_count: usize) -> usize {
    let index = (timestamp * frame_rate).round() as usize;
    index.min(frame_count - 1)
}

fn is_image_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref(),
        Some("png" | "jpg" | "jpeg" | "bmp" | "tiff" | "tif")
    )
}

fn load_frame(path: &Path) -> Result<FrameImage> {
    let image = image::open(path)
        .with_context(|| format!("loading image {}", path.display()))?
        .to_rgba8();
    Ok(FrameImage {
        width: image.width(),
        height: image.height(),
        pixels: image.into_raw(),
    })
}

/// Video file decoder over OpenCV's `VideoCapture`.
#[cfg(feature = "video-opencv")]
pub struct OpenCvVideoDecoder {
    capture: opencv::videoio::VideoCapture,
    metadata: VideoMetadata,
}

#[cfg(feature = "video-opencv")]
impl OpenCvVideoDecoder {
    pub fn open(path: &Path) -> Result<Self> {
        use opencv::prelude::*;
        use opencv::videoio;

        let capture = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            .with_context(|| format!("opening video {}", path.display()))?;
        if !capture.is_opened()? {
            bail!("could not open video {}", path.display());
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        if width == 0 || height == 0 {
            bail!("video {} reports zero dimensions", path.display());
        }

        // Duration comes from the container; stepping still uses the
        // configured nominal rate, not the container fps.
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let duration = if fps > 0.0 { frame_count / fps } else { 0.0 };

        Ok(Self {
            capture,
            metadata: VideoMetadata {
                width,
                height,
                duration,
            },
        })
    }
}

#[cfg(feature = "video-opencv")]
impl FrameDecoder for OpenCvVideoDecoder {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn decode_at(&mut self, timestamp: f64) -> Result<FrameImage> {
        use opencv::prelude::*;
        use opencv::{core, imgproc, videoio};

        self.capture
            .set(videoio::CAP_PROP_POS_MSEC, timestamp * 1000.0)?;

        let mut frame = core::Mat::default();
        if !self.capture.read(&mut frame)? || frame.cols() == 0 {
            bail!("no frame at {:.3}s", timestamp);
        }

        let mut rgba = core::Mat::default();
        imgproc::cvt_color(&frame, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

        Ok(FrameImage {
            width: rgba.cols() as u32,
            height: rgba.rows() as u32,
            pixels: rgba.data_bytes()?.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decoder producing single-pixel frames without touching the
    /// filesystem.
    struct SyntheticDecoder {
        metadata: VideoMetadata,
    }

    impl FrameDecoder for SyntheticDecoder {
        fn metadata(&self) -> VideoMetadata {
            self.metadata
        }

        fn decode_at(&mut self, timestamp: f64) -> Result<FrameImage> {
            if timestamp > self.metadata.duration {
                bail!("timestamp {} past the end", timestamp);
            }
            Ok(FrameImage {
                width: 1,
                height: 1,
                pixels: vec![0, 0, 0, 255],
            })
        }
    }

    fn synthetic() -> Box<dyn FrameDecoder> {
        Box::new(SyntheticDecoder {
            metadata: VideoMetadata {
                width: 1,
                height: 1,
                duration: 1.0,
            },
        })
    }

    #[test]
    fn worker_reports_metadata_then_frames_in_request_order() {
        let (request_tx, request_rx) = channel();
        let (event_tx, event_rx) = channel();

        request_tx.send(MediaRequest::Seek(0.0)).unwrap();
        request_tx.send(MediaRequest::Seek(0.25)).unwrap();
        request_tx.send(MediaRequest::Seek(0.5)).unwrap();
        drop(request_tx);

        serve_frames(synthetic(), &request_rx, &event_tx);
        drop(event_tx);

        let events: Vec<MediaEvent> = event_rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], MediaEvent::MetadataLoaded(_)));

        for (event, expected) in events[1..].iter().zip([0.0, 0.25, 0.5]) {
            match event {
                MediaEvent::FrameReady { timestamp, .. } => assert_eq!(*timestamp, expected),
                other => panic!("expected a frame event, got {:?}", other),
            }
        }
    }

    #[test]
    fn worker_keeps_serving_after_a_failed_decode() {
        let (request_tx, request_rx) = channel();
        let (event_tx, event_rx) = channel();

        request_tx.send(MediaRequest::Seek(2.0)).unwrap();
        request_tx.send(MediaRequest::Seek(0.5)).unwrap();
        drop(request_tx);

        serve_frames(synthetic(), &request_rx, &event_tx);
        drop(event_tx);

        let events: Vec<MediaEvent> = event_rx.iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], MediaEvent::MetadataLoaded(_)));
        assert!(matches!(events[1], MediaEvent::Failed(_)));
        assert!(matches!(events[2], MediaEvent::FrameReady { timestamp, .. } if timestamp == 0.5));
    }

    #[test]
    fn sequence_index_is_rounded_and_clamped() {
        assert_eq!(frame_index_at(0.0, 25.0, 100), 0);
        assert_eq!(frame_index_at(0.04, 25.0, 100), 1);
        assert_eq!(frame_index_at(0.96, 25.0, 100), 24);
        // Past the last frame: clamped.
        assert_eq!(frame_index_at(10.0, 25.0, 100), 99);
        // Negative timestamps saturate to the first frame.
        assert_eq!(frame_index_at(-1.0, 25.0, 100), 0);
    }

    #[test]
    fn image_extensions_are_matched_case_insensitively() {
        assert!(is_image_file(Path::new("frames/frame_001.png")));
        assert!(is_image_file(Path::new("frames/FRAME_002.JPG")));
        assert!(!is_image_file(Path::new("frames/notes.txt")));
        assert!(!is_image_file(Path::new("frames/clip.mp4")));
    }
}
