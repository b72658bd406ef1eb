/*!
    Thread-safe handle to an [`ImageBuffer`].
*/

use std::sync::Arc;

use framebuf_types::{Error, Layout, PixelFormat, Result};
use parking_lot::Mutex;

use crate::buffer::ImageBuffer;

/**
    Shared, lockable image buffer.

    Reading the canonical data can rewrite the stored bytes, so a plain
    `&ImageBuffer` cannot be read from several threads at once. This handle
    serializes every access through one mutex per buffer. Clones share the
    same buffer.

    Data is returned as owned copies so the lock is never held past a call.
*/
#[derive(Clone, Debug)]
pub struct SharedImageBuffer {
    inner: Arc<Mutex<ImageBuffer>>,
}

impl SharedImageBuffer {
    /**
        Wrap a buffer for sharing.
    */
    pub fn new(buffer: ImageBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    /**
        Layout of the stored bytes.
    */
    pub fn layout(&self) -> Layout {
        self.inner.lock().layout()
    }

    /**
        See [`ImageBuffer::generation`].
    */
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation()
    }

    /**
        See [`ImageBuffer::get_data`].
    */
    pub fn get_data<F>(&self, format: F, pitch: i32) -> Result<Vec<u8>>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        Ok(self.inner.lock().get_data(format, pitch)?.into_owned())
    }

    /**
        See [`ImageBuffer::set_data`].
    */
    pub fn set_data<F>(&self, format: F, pitch: i32, data: Vec<u8>) -> Result<()>
    where
        F: TryInto<PixelFormat>,
        Error: From<F::Error>,
    {
        self.inner.lock().set_data(format, pitch, data)
    }

    /**
        See [`ImageBuffer::data`].
    */
    pub fn data(&self) -> Vec<u8> {
        self.inner.lock().data().to_vec()
    }

    /**
        See [`ImageBuffer::set_canonical_data`].
    */
    pub fn set_canonical_data(&self, data: Vec<u8>) -> Result<()> {
        self.inner.lock().set_canonical_data(data)
    }

    /**
        Run `f` with shared access to the buffer while holding the lock.
    */
    pub fn with<R>(&self, f: impl FnOnce(&ImageBuffer) -> R) -> R {
        f(&self.inner.lock())
    }

    /**
        Run `f` with exclusive access to the buffer while holding the lock.
    */
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut ImageBuffer) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /**
        Unwrap the buffer if this is the last handle, otherwise return the
        handle unchanged.
    */
    pub fn try_into_inner(self) -> std::result::Result<ImageBuffer, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl From<ImageBuffer> for SharedImageBuffer {
    fn from(buffer: ImageBuffer) -> Self {
        Self::new(buffer)
    }
}

// Ensure handles can be shared across threads
static_assertions::assert_impl_all!(SharedImageBuffer: Send, Sync, Clone);
