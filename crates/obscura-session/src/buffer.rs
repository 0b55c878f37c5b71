use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard};

/// Fixed-size frame region shared between the device writer and
/// callback dispatch.
///
/// Allocated when preview starts and dropped only after the preview
/// worker has fully stopped, so no frame handle can outlive the memory
/// it points into. The size never changes while preview is active.
pub struct FrameBuffer {
    size: usize,
    data: Mutex<Box<[u8]>>,
}

impl FrameBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: Mutex::new(vec![0u8; size].into_boxed_slice()),
        }
    }

    /// Buffer sized for one preview frame at 2 bytes per pixel.
    pub fn for_preview(width: u32, height: u32) -> Self {
        Self::new(width as usize * height as usize * 2)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Exclusive access to the frame bytes.
    ///
    /// The same guard serves as the device's write destination and then
    /// as the read-only frame for dispatch, so a frame is always fully
    /// written before anyone reads it.
    pub fn lock(&self) -> FrameGuard<'_> {
        FrameGuard(self.data.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Exclusive handle to the bytes of a [`FrameBuffer`].
pub struct FrameGuard<'a>(MutexGuard<'a, Box<[u8]>>);

impl Deref for FrameGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}
