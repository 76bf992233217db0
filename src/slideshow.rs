//! Presentation loop.
//!
//! One tick shows one set: slot 0 goes to display 0, slot 1 to display 1 and
//! so on, strictly in that order. The cursor then moves to the next set and
//! wraps to the first after the last one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::cache::thumbnail::{thumbnail_exists, ThumbnailCache};
use crate::display::{blank, Display};
use crate::error::{Result, WallError};
use crate::state::data::ImageSet;

/// How often an interruptible sleep checks for a stop request
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cloneable flag that asks a running slideshow to finish its current tick and return
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless stopped first. Returns false if stopped.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_stopped() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(STOP_POLL_INTERVAL.min(deadline - now));
        }
    }
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Index of the set that was shown
    pub set_index: usize,
    /// Number of displays that received an image
    pub rendered: usize,
    pub elapsed: Duration,
}

/// Owns the displays, the sets and the cursor into them
pub struct Slideshow {
    displays: Vec<Box<dyn Display>>,
    sets: Vec<ImageSet>,
    cache: ThumbnailCache,
    current: usize,
    settle_delay: Duration,
    prewarm: bool,
}

impl Slideshow {
    /// Default pause between blanking the panels and the first set
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

    pub fn new(
        displays: Vec<Box<dyn Display>>,
        sets: Vec<ImageSet>,
        cache: ThumbnailCache,
    ) -> Result<Self> {
        if sets.is_empty() {
            return Err(WallError::NoImages("no image sets to present".to_string()));
        }
        if displays.is_empty() {
            return Err(WallError::InvalidGeometry(
                "at least one display is required".to_string(),
            ));
        }

        Ok(Self {
            displays,
            sets,
            cache,
            current: 0,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            prewarm: true,
        })
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_prewarm(mut self, prewarm: bool) -> Self {
        self.prewarm = prewarm;
        self
    }

    /// Index of the set the next tick will show
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Clear every display, in slot order
    pub fn blank_all(&mut self) -> Result<()> {
        for display in self.displays.iter_mut() {
            blank(&mut **display).map_err(|source| WallError::Display {
                display: display.name().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Build every thumbnail that is not on disk yet.
    ///
    /// Returns how many were generated.
    pub fn prewarm(&self) -> Result<usize> {
        let started = Instant::now();
        let mut generated = 0;

        for set in &self.sets {
            for (display, file) in self.displays.iter().zip(set.files()) {
                if thumbnail_exists(&file.path) {
                    continue;
                }
                self.cache.get(&**display, &file.path)?;
                generated += 1;
            }
        }

        if generated > 0 {
            info!(
                "⏳ Prepared {} thumbnails in {:.2}s",
                generated,
                started.elapsed().as_secs_f64()
            );
        }
        Ok(generated)
    }

    /// Show the current set, then advance the cursor.
    ///
    /// Every set is shown, the last one included; after it the cursor wraps
    /// to 0. A short final set drives only as many displays as it has files.
    /// On error the cursor stays put.
    pub fn tick(&mut self) -> Result<TickReport> {
        let started = Instant::now();
        let set_index = self.current;
        let set = &self.sets[set_index];
        let cache = &self.cache;

        let mut rendered = 0;
        for (panel, file) in self.displays.iter_mut().zip(set.files()) {
            let frame = cache.get(&**panel, &file.path)?;
            panel.render(&frame).map_err(|source| WallError::Display {
                display: panel.name().to_string(),
                source,
            })?;
            debug!("{} ← slot {}: {}", panel.name(), file.slot, file.file_name());
            rendered += 1;
        }

        self.current = (set_index + 1) % self.sets.len();
        debug!("Set {} is capture {}", set_index + 1, set.stamp().unwrap_or("?"));

        Ok(TickReport {
            set_index,
            rendered,
            elapsed: started.elapsed(),
        })
    }

    /// Blank the panels, settle, then tick until `stop` is raised.
    pub fn run(&mut self, stop: &StopSignal) -> Result<()> {
        self.blank_all()?;
        if self.prewarm {
            self.prewarm()?;
        }

        if !stop.sleep(self.settle_delay) {
            info!("👋 Stopped before the first set");
            return Ok(());
        }

        info!("▶️  Presenting {} sets on {} displays", self.set_count(), self.displays.len());
        while !stop.is_stopped() {
            let report = self.tick()?;
            info!(
                "🖼️  Drew set {}/{} on {} displays in {:.3}s",
                report.set_index + 1,
                self.set_count(),
                report.rendered,
                report.elapsed.as_secs_f64()
            );
        }

        info!("👋 Slideshow stopped, next set would be {}", self.current_index() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::testing::{FrameLog, RecordingDisplay};
    use crate::display::Rotation;
    use crate::state::library::ImageSetGrouper;
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    /// Write small PNGs named like captures: `stamps` x `per_stamp`
    fn write_captures(dir: &Path, stamps: &[&str], per_stamp: usize) {
        for stamp in stamps {
            for slot in 1..=per_stamp {
                let img = RgbImage::from_pixel(40, 30, Rgb([200, 100, 50]));
                img.save(dir.join(format!("{}.{}.png", stamp, slot))).unwrap();
            }
        }
    }

    fn recording_displays(count: usize, log: &FrameLog) -> Vec<Box<dyn Display>> {
        (0..count)
            .map(|i| {
                let name = format!("panel-{}", i);
                Box::new(RecordingDisplay::new(&name, 135, 240, Rotation::Deg90, log))
                    as Box<dyn Display>
            })
            .collect()
    }

    fn slideshow(dir: &Path, displays: Vec<Box<dyn Display>>) -> Slideshow {
        let sets = ImageSetGrouper::new(displays.len())
            .unwrap()
            .build(dir)
            .unwrap();
        Slideshow::new(displays, sets, ThumbnailCache::default())
            .unwrap()
            .with_settle_delay(Duration::ZERO)
    }

    #[test]
    fn test_wraps_to_first_set_after_last() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(
            dir.path(),
            &["2021-06-01_10-00", "2021-06-01_11-00", "2021-06-01_12-00", "2021-06-01_13-00"],
            1,
        );
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut show = slideshow(dir.path(), recording_displays(1, &log));
        assert_eq!(show.set_count(), 4);

        let shown: Vec<usize> = (0..6).map(|_| show.tick().unwrap().set_index).collect();

        assert_eq!(shown, vec![0, 1, 2, 3, 0, 1]);
        assert_eq!(show.current_index(), 2);
    }

    #[test]
    fn test_single_set_repeats() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(dir.path(), &["2021-06-01_10-00"], 2);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut show = slideshow(dir.path(), recording_displays(2, &log));

        for _ in 0..3 {
            assert_eq!(show.tick().unwrap().set_index, 0);
        }
        assert_eq!(log.borrow().len(), 6);
    }

    #[test]
    fn test_partial_final_set_drives_fewer_displays() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(dir.path(), &["2021-06-01_10-00", "2021-06-01_11-00"], 3);
        write_captures(dir.path(), &["2021-06-01_12-00"], 1);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut show = slideshow(dir.path(), recording_displays(3, &log));

        let rendered: Vec<usize> = (0..4).map(|_| show.tick().unwrap().rendered).collect();

        assert_eq!(rendered, vec![3, 3, 1, 3]);
        let frames = log.borrow();
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[6].display, "panel-0");
    }

    #[test]
    fn test_displays_update_in_slot_order() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(dir.path(), &["2021-06-01_10-00"], 3);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut show = slideshow(dir.path(), recording_displays(3, &log));

        show.tick().unwrap();

        let order: Vec<String> = log.borrow().iter().map(|f| f.display.clone()).collect();
        assert_eq!(order, vec!["panel-0", "panel-1", "panel-2"]);
        assert!(log.borrow().iter().all(|f| (f.width, f.height) == (240, 135)));
    }

    #[test]
    fn test_no_sets_is_fatal() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let result = Slideshow::new(recording_displays(3, &log), Vec::new(), ThumbnailCache::default());

        assert!(matches!(result, Err(WallError::NoImages(_))));
    }

    #[test]
    fn test_failed_render_keeps_cursor() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(dir.path(), &["2021-06-01_10-00", "2021-06-01_11-00"], 2);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut broken = RecordingDisplay::new("right", 135, 240, Rotation::Deg90, &log);
        broken.fail = true;
        let displays: Vec<Box<dyn Display>> = vec![
            Box::new(RecordingDisplay::new("left", 135, 240, Rotation::Deg90, &log)),
            Box::new(broken),
        ];
        let mut show = slideshow(dir.path(), displays);

        let err = show.tick().unwrap_err();

        match err {
            WallError::Display { display, .. } => assert_eq!(display, "right"),
            other => panic!("expected Display error, got {:?}", other),
        }
        assert_eq!(show.current_index(), 0);
    }

    #[test]
    fn test_prewarm_generates_each_thumbnail_once() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(dir.path(), &["2021-06-01_10-00", "2021-06-01_11-00", "2021-06-01_12-00"], 1);
        let log = Rc::new(RefCell::new(Vec::new()));
        let show = slideshow(dir.path(), recording_displays(1, &log));

        assert_eq!(show.prewarm().unwrap(), 3);
        assert_eq!(show.prewarm().unwrap(), 0);
        assert!(dir.path().join("2021-06-01_11-00.thumb.jpg").exists());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_run_blanks_then_stops_on_signal() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(dir.path(), &["2021-06-01_10-00", "2021-06-01_11-00"], 2);
        let log = Rc::new(RefCell::new(Vec::new()));
        let stop = StopSignal::new();

        // 2 blank frames + 3 ticks of 2 displays
        let mut last = RecordingDisplay::new("panel-1", 135, 240, Rotation::Deg90, &log);
        last.stop_after = Some((8, stop.clone()));
        let displays: Vec<Box<dyn Display>> = vec![
            Box::new(RecordingDisplay::new("panel-0", 135, 240, Rotation::Deg90, &log)),
            Box::new(last),
        ];
        let mut show = slideshow(dir.path(), displays);

        show.run(&stop).unwrap();

        let frames = log.borrow();
        assert_eq!(frames.len(), 8);
        assert!(frames[0].all_black && frames[1].all_black);
        assert!(!frames[2].all_black);
        assert_eq!(show.current_index(), 1);
    }

    #[test]
    fn test_stop_before_settle_skips_ticks() {
        let dir = tempfile::tempdir().unwrap();
        write_captures(dir.path(), &["2021-06-01_10-00"], 1);
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut show = slideshow(dir.path(), recording_displays(1, &log))
            .with_settle_delay(Duration::from_secs(60))
            .with_prewarm(false);
        let stop = StopSignal::new();
        stop.stop();

        show.run(&stop).unwrap();

        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].all_black);
    }

    #[test]
    fn test_sleep_returns_early_when_stopped() {
        let stop = StopSignal::new();
        assert!(stop.sleep(Duration::from_millis(1)));

        stop.stop();
        let started = Instant::now();
        assert!(!stop.sleep(Duration::from_secs(30)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
