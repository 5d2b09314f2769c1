//! In-process stand-ins for the driver used by unit tests

use std::os::raw::{c_char, c_int};

use crate::config::AdlConfig;
use crate::context::Adl;
use crate::ffi::*;

pub(crate) unsafe extern "C" fn create(
    callback: ADL_MAIN_MALLOC_CALLBACK,
    _connected: c_int,
    context: *mut ADL_CONTEXT_HANDLE,
) -> c_int {
    match callback {
        Some(alloc) => {
            *context = alloc(8);
            0
        }
        None => -11,
    }
}

pub(crate) unsafe extern "C" fn destroy(context: ADL_CONTEXT_HANDLE) -> c_int {
    libc::free(context);
    0
}

/// A context over `functions` plus working create / destroy entry points
pub(crate) fn fake_adl(functions: AdlFunctions) -> Adl {
    let functions = AdlFunctions {
        ADL2_Main_Control_Create: Some(create),
        ADL2_Main_Control_Destroy: Some(destroy),
        ..functions
    };
    match Adl::with_functions(functions, &AdlConfig::default()) {
        Ok(adl) => adl,
        Err(err) => panic!("fake context: {err}"),
    }
}

/// Copy `text` into a fixed-size C buffer, NUL terminated
pub(crate) fn fill(buf: &mut [c_char], text: &str) {
    for (dst, src) in buf.iter_mut().zip(text.bytes().chain(std::iter::once(0))) {
        *dst = src as c_char;
    }
}

/// Allocate `values` with `malloc` the way the driver's callback would
pub(crate) unsafe fn driver_array<T: Copy>(values: &[T]) -> *mut T {
    let size = std::mem::size_of_val(values).max(1);
    let ptr = libc::malloc(size) as *mut T;
    std::ptr::copy_nonoverlapping(values.as_ptr(), ptr, values.len());
    ptr
}
