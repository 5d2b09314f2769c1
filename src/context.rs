//! The ADL2 client context and driver-owned memory

use std::ffi::CString;
use std::fmt;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;

use libloading::Library;

use crate::config::AdlConfig;
use crate::error::{AdlError, AdlResult};
use crate::ffi::{AdlFunctions, ADL_CONTEXT_HANDLE};
use crate::library::AdlLibrary;
use crate::status::AdlStatus;

/// Call a bound entry point with the context handle prepended and check its status
///
/// Expands to an `AdlResult<AdlStatus>`; a symbol missing from the loaded
/// driver becomes [`AdlError::SymbolNotFound`].
macro_rules! adl_call {
    ($adl:expr, $name:ident($($arg:expr),* $(,)?)) => {{
        let adl: &$crate::context::Adl = $adl;
        match adl.functions().$name {
            Some(function) => {
                // SAFETY: the handle is live for as long as `adl` and every
                // pointer argument references memory owned by the caller.
                let raw = unsafe { function(adl.context_handle(), $($arg),*) };
                $crate::status::AdlStatus::check(stringify!($name), raw)
            }
            None => Err($crate::error::AdlError::SymbolNotFound(stringify!($name))),
        }
    }};
}

pub(crate) use adl_call;

/// Allocation callback handed to the driver; buffers are released with `free`
pub(crate) unsafe extern "C" fn adl_malloc(size: c_int) -> *mut c_void {
    libc::malloc(size.max(0) as libc::size_t)
}

/// An open ADL2 client
///
/// Owns the vendor context handle and destroys it on drop. The raw handle
/// makes this type neither `Send` nor `Sync`.
pub struct Adl {
    functions: AdlFunctions,
    context: ADL_CONTEXT_HANDLE,
    config: AdlConfig,
    location: Option<String>,
    // declared last so the library is unloaded after the context is destroyed
    _library: Option<Library>,
}

impl Adl {
    /// Load the driver library and create a context
    pub fn open(config: &AdlConfig) -> AdlResult<Self> {
        let (library, functions, location) = AdlLibrary::open(config)?.into_parts();
        let context = create_context(&functions, config)?;
        log::info!("ADL context created from {}", location);
        Ok(Self {
            functions,
            context,
            config: config.clone(),
            location: Some(location),
            _library: Some(library),
        })
    }

    /// Load with [`AdlConfig::from_env`]
    pub fn open_default() -> AdlResult<Self> {
        Self::open(&AdlConfig::from_env())
    }

    /// Create a context from an already resolved function table
    ///
    /// The entry points must stay valid for the lifetime of the returned
    /// value. Used to drive the safe layer with in-process functions.
    pub fn with_functions(functions: AdlFunctions, config: &AdlConfig) -> AdlResult<Self> {
        let context = create_context(&functions, config)?;
        log::debug!("ADL context created from an injected function table");
        Ok(Self {
            functions,
            context,
            config: config.clone(),
            location: None,
            _library: None,
        })
    }

    /// Re-read adapter and display state held by the driver
    pub fn refresh(&self) -> AdlResult<()> {
        adl_call!(self, ADL2_Main_Control_Refresh())?;
        Ok(())
    }

    /// Whether the loaded driver exports `name`
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.has(name)
    }

    /// The resolved entry points
    pub fn functions(&self) -> &AdlFunctions {
        &self.functions
    }

    /// Raw context handle for calls made through [`Adl::functions`]
    pub fn context_handle(&self) -> ADL_CONTEXT_HANDLE {
        self.context
    }

    /// Configuration the context was created with
    pub fn config(&self) -> &AdlConfig {
        &self.config
    }

    /// Where the driver library was loaded from; `None` for injected tables
    pub fn library_location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Look up a private driver export through `ADL2_Main_Control_GetProcAddress`
    pub fn proc_address(&self, name: &str) -> AdlResult<Option<ptr::NonNull<c_void>>> {
        let function = self
            .functions
            .ADL2_Main_Control_GetProcAddress
            .ok_or(AdlError::SymbolNotFound("ADL2_Main_Control_GetProcAddress"))?;
        let name = CString::new(name)
            .map_err(|_| AdlError::InvalidParameter(format!("{name:?} contains a NUL byte")))?;
        // SAFETY: the name outlives the call and the driver only reads it;
        // a null module selects the driver library itself.
        let address = unsafe {
            function(
                self.context,
                ptr::null_mut(),
                name.as_ptr() as *mut c_char,
            )
        };
        Ok(ptr::NonNull::new(address))
    }
}

fn create_context(functions: &AdlFunctions, config: &AdlConfig) -> AdlResult<ADL_CONTEXT_HANDLE> {
    let mut context: ADL_CONTEXT_HANDLE = ptr::null_mut();
    let enum_connected = config.enum_connected_adapters();

    let created = match (config.threading, functions.ADL2_Main_ControlX2_Create) {
        (Some(threading), Some(create)) => {
            // SAFETY: `adl_malloc` matches the callback signature and `context` is a valid out pointer.
            let raw = unsafe { create(Some(adl_malloc), enum_connected, &mut context, threading.raw()) };
            AdlStatus::check("ADL2_Main_ControlX2_Create", raw)
        }
        (threading, _) => {
            if threading.is_some() {
                log::debug!("ADL2_Main_ControlX2_Create missing, ignoring threading model");
            }
            let create = functions
                .ADL2_Main_Control_Create
                .ok_or(AdlError::SymbolNotFound("ADL2_Main_Control_Create"))?;
            // SAFETY: as above.
            let raw = unsafe { create(Some(adl_malloc), enum_connected, &mut context) };
            AdlStatus::check("ADL2_Main_Control_Create", raw)
        }
    };
    created?;

    if context.is_null() {
        return Err(AdlError::Status {
            function: "ADL2_Main_Control_Create",
            status: AdlStatus::NotInit,
        });
    }
    Ok(context)
}

impl Drop for Adl {
    fn drop(&mut self) {
        let Some(destroy) = self.functions.ADL2_Main_Control_Destroy else {
            log::warn!("ADL2_Main_Control_Destroy missing, leaking context");
            return;
        };
        // SAFETY: the handle was issued by create and is destroyed once.
        let raw = unsafe { destroy(self.context) };
        match AdlStatus::from_raw(raw).into_result() {
            Ok(_) => log::debug!("ADL context destroyed"),
            Err(status) => log::warn!("ADL2_Main_Control_Destroy failed: {}", status),
        }
        self.context = ptr::null_mut();
    }
}

impl fmt::Debug for Adl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adl")
            .field("context", &self.context)
            .field("location", &self.location)
            .field("functions", &self.functions)
            .finish()
    }
}

/// An array the driver allocated through the context's allocation callback
///
/// Freed with `free` on drop.
pub struct DriverBuffer<T> {
    ptr: *mut T,
    len: usize,
}

impl<T> DriverBuffer<T> {
    /// Take ownership of `count` elements at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from `malloc` and point to at least
    /// `count` initialised values of `T`. Nothing else may free it.
    pub unsafe fn from_raw(ptr: *mut T, count: c_int) -> Self {
        let len = if ptr.is_null() { 0 } else { count.max(0) as usize };
        Self { ptr, len }
    }

    /// An empty buffer that frees nothing
    pub fn empty() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    /// The elements
    pub fn as_slice(&self) -> &[T] {
        if self.ptr.is_null() || self.len == 0 {
            &[]
        } else {
            // SAFETY: guaranteed by `from_raw`.
            unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// True when the driver returned nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> DriverBuffer<T> {
    /// Copy the elements out
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T> Drop for DriverBuffer<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            // SAFETY: allocated by `adl_malloc`, owned exclusively by this buffer.
            unsafe { libc::free(self.ptr as *mut c_void) };
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DriverBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Decode a fixed-size C string buffer: stops at the first NUL, or the end
/// of the buffer when there is none, replacing invalid UTF-8
pub fn c_buf_to_string(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    thread_local! {
        static DESTROYED: Cell<usize> = const { Cell::new(0) };
    }

    unsafe extern "C" fn create(
        callback: crate::ffi::ADL_MAIN_MALLOC_CALLBACK,
        _connected: c_int,
        context: *mut ADL_CONTEXT_HANDLE,
    ) -> c_int {
        // any non-null value works as a handle; borrow the callback to produce one
        let Some(alloc) = callback else { return -11 };
        *context = alloc(8);
        0
    }

    unsafe extern "C" fn destroy(context: ADL_CONTEXT_HANDLE) -> c_int {
        libc::free(context);
        DESTROYED.with(|count| count.set(count.get() + 1));
        0
    }

    unsafe extern "C" fn create_fails(
        _callback: crate::ffi::ADL_MAIN_MALLOC_CALLBACK,
        _connected: c_int,
        _context: *mut ADL_CONTEXT_HANDLE,
    ) -> c_int {
        -2
    }

    fn table() -> AdlFunctions {
        AdlFunctions {
            ADL2_Main_Control_Create: Some(create),
            ADL2_Main_Control_Destroy: Some(destroy),
            ..Default::default()
        }
    }

    #[test]
    fn context_is_destroyed_on_drop() {
        let before = DESTROYED.with(Cell::get);
        {
            let adl = Adl::with_functions(table(), &AdlConfig::default()).unwrap();
            assert!(!adl.context_handle().is_null());
            assert!(adl.library_location().is_none());
        }
        assert_eq!(DESTROYED.with(Cell::get), before + 1);
    }

    #[test]
    fn create_failure_is_reported() {
        let functions = AdlFunctions {
            ADL2_Main_Control_Create: Some(create_fails),
            ..Default::default()
        };
        let err = Adl::with_functions(functions, &AdlConfig::default()).unwrap_err();
        assert_eq!(err.status(), Some(AdlStatus::NotInit));
    }

    #[test]
    fn missing_symbol_is_reported_on_call() {
        let adl = Adl::with_functions(table(), &AdlConfig::default()).unwrap();
        match adl.refresh() {
            Err(AdlError::SymbolNotFound(name)) => assert_eq!(name, "ADL2_Main_Control_Refresh"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(!adl.has_function("ADL2_Main_Control_Refresh"));
    }

    #[test]
    fn driver_buffer_exposes_and_frees() {
        let raw = unsafe { adl_malloc(3 * std::mem::size_of::<c_int>() as c_int) } as *mut c_int;
        unsafe {
            for i in 0..3 {
                *raw.add(i) = i as c_int * 10;
            }
        }
        let buffer = unsafe { DriverBuffer::from_raw(raw, 3) };
        assert_eq!(buffer.as_slice(), &[0, 10, 20]);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn null_and_negative_buffers_are_empty() {
        let null: DriverBuffer<c_int> = unsafe { DriverBuffer::from_raw(ptr::null_mut(), 5) };
        assert!(null.is_empty());

        let raw = unsafe { adl_malloc(4) } as *mut c_int;
        let negative = unsafe { DriverBuffer::from_raw(raw, -1) };
        assert!(negative.as_slice().is_empty());
        assert!(DriverBuffer::<u8>::empty().is_empty());
    }

    #[test]
    fn c_strings_stop_at_nul() {
        let mut buf = [0 as c_char; 8];
        for (dst, src) in buf.iter_mut().zip(b"Radeon\0x") {
            *dst = *src as c_char;
        }
        assert_eq!(c_buf_to_string(&buf), "Radeon");
    }

    #[test]
    fn c_strings_without_nul_use_the_whole_buffer() {
        let buf: Vec<c_char> = b"RX 7900".iter().map(|&b| b as c_char).collect();
        assert_eq!(c_buf_to_string(&buf), "RX 7900");
        let invalid = [0xFFu8 as c_char, b'A' as c_char, 0];
        assert_eq!(c_buf_to_string(&invalid), "\u{FFFD}A");
    }
}
