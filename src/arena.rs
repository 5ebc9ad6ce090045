//! The cache-line aligned buffer the measurements read from.

use std::io;
use std::marker::PhantomData;
use std::mem;
use std::ptr::{self, NonNull};

use libc::{c_void, free, posix_memalign};

use crate::error::{Error, Result};

pub struct Arena {
    ptr: NonNull<i32>,
    len: usize,
    align: usize,
}

impl Arena {
    /// Allocates `len` elements starting on an `align`-byte boundary.
    ///
    /// The contents are uninitialized until [`Arena::warm`] runs; nothing
    /// else reads them before that.
    pub fn allocate(len: usize, align: usize) -> Result<Self> {
        let invalid = |msg: &str| Error::Allocation {
            len,
            align,
            source: io::Error::new(io::ErrorKind::InvalidInput, msg.to_string()),
        };

        if len == 0 {
            return Err(invalid("arena must hold at least one element"));
        }
        let size = len
            .checked_mul(mem::size_of::<i32>())
            .ok_or_else(|| invalid("arena size overflows usize"))?;

        let mut raw: *mut c_void = ptr::null_mut();
        let rc = unsafe { posix_memalign(&mut raw, align, size) };
        if rc != 0 {
            return Err(Error::Allocation {
                len,
                align,
                source: io::Error::from_raw_os_error(rc),
            });
        }

        let ptr = NonNull::new(raw as *mut i32).ok_or_else(|| Error::Allocation {
            len,
            align,
            source: io::Error::from(io::ErrorKind::OutOfMemory),
        })?;

        Ok(Self { ptr, len, align })
    }

    /// Writes element i = i once, so every page is backed before timing starts.
    pub fn warm(&mut self) {
        for i in 0..self.len {
            unsafe { ptr::write_volatile(self.ptr.as_ptr().add(i), i as i32) };
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn align(&self) -> usize {
        self.align
    }

    pub fn as_ptr(&self) -> *const i32 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[i32] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn target_index(&self) -> usize {
        self.len / 2
    }

    /// The midpoint element, the only address either loop ever touches.
    pub fn target(&self) -> Target<'_> {
        Target {
            ptr: unsafe { self.ptr.as_ptr().add(self.target_index()) },
            _arena: PhantomData,
        }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        log::debug!("releasing arena of {} elements", self.len);
        unsafe { free(self.ptr.as_ptr() as *mut c_void) };
    }
}

/// A single arena element, borrowed for the length of a run.
#[derive(Clone, Copy)]
pub struct Target<'a> {
    ptr: *const i32,
    _arena: PhantomData<&'a Arena>,
}

impl<'a> Target<'a> {
    /// Volatile load; the compiler cannot drop or merge it.
    #[inline(always)]
    pub fn read(&self) -> i32 {
        unsafe { ptr::read_volatile(self.ptr) }
    }

    pub fn addr(&self) -> *const u8 {
        self.ptr as *const u8
    }
}
