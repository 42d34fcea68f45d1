use crate::matcher::FontMatcher;
use crate::{Context, DetectError, Detector, InstallStatus};
use std::ops::ControlFlow;
use std::sync::Arc;

/// A finite, one-shot sequence of installed font family names.
///
/// Sources may push names from a platform callback or walk a list; either way the visitor
/// can stop the sequence early by returning [`ControlFlow::Break`].
pub trait FamilySource {
    fn visit(&self, visitor: &mut dyn FnMut(&str) -> ControlFlow<()>);
}

impl<S: AsRef<str>> FamilySource for Vec<S> {
    fn visit(&self, visitor: &mut dyn FnMut(&str) -> ControlFlow<()>) {
        for name in self {
            if visitor(name.as_ref()).is_break() {
                return;
            }
        }
    }
}

/// The font families installed on this system, as reported by GDI's `EnumFontFamiliesExW`.
///
/// Always empty on non-Windows systems, and when GDI can't be loaded.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemFamilies;

impl FamilySource for SystemFamilies {
    #[cfg(windows)]
    fn visit(&self, visitor: &mut dyn FnMut(&str) -> ControlFlow<()>) {
        windows::visit_families(visitor);
    }

    #[cfg(not(windows))]
    fn visit(&self, _visitor: &mut dyn FnMut(&str) -> ControlFlow<()>) {}
}

/// Enumerates installed font families through the Windows GDI and matches their names.
///
/// Vertical-writing variants (names starting with `@`) and empty names are skipped.
/// If GDI is unavailable the detector reports [`InstallStatus::NotInstalled`] without error.
///
/// This is a no-op on non-Windows systems.
#[derive(Debug, Clone)]
pub struct GdiDetector<S = SystemFamilies> {
    source: S,
    matcher: Arc<FontMatcher>,
}

impl GdiDetector {
    pub fn new() -> Self {
        Self::with_source(SystemFamilies)
    }
}

impl Default for GdiDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FamilySource> GdiDetector<S> {
    /// Match against the families from another source instead of GDI.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            matcher: FontMatcher::nerd_fonts(),
        }
    }

    pub fn matcher(mut self, matcher: Arc<FontMatcher>) -> Self {
        self.matcher = matcher;
        self
    }
}

impl<S: FamilySource> Detector for GdiDetector<S> {
    fn name(&self) -> &str {
        "windows-gdi"
    }

    fn detect(&self, _cx: &Context) -> Result<InstallStatus, DetectError> {
        let mut found = false;

        self.source.visit(&mut |name| {
            let name = name.trim();
            if name.is_empty() || name.starts_with('@') {
                return ControlFlow::Continue(());
            }

            if self.matcher.is_match(name) {
                #[cfg(feature = "log")]
                log::debug!("found nerd font family {name:?}");

                found = true;
                return ControlFlow::Break(());
            }

            ControlFlow::Continue(())
        });

        if found {
            Ok(InstallStatus::Installed)
        } else {
            Ok(InstallStatus::NotInstalled)
        }
    }
}

#[cfg(windows)]
mod windows {
    use std::ffi::{CStr, c_char, c_void};
    use std::ops::ControlFlow;
    use std::ptr;

    type Handle = *mut c_void;
    type Visitor<'a> = &'a mut dyn FnMut(&str) -> ControlFlow<()>;

    const DEFAULT_CHARSET: u8 = 1;

    /// `LOGFONTW` from wingdi.h.
    #[repr(C)]
    #[derive(Default)]
    struct LogFontW {
        height: i32,
        width: i32,
        escapement: i32,
        orientation: i32,
        weight: i32,
        italic: u8,
        underline: u8,
        strike_out: u8,
        char_set: u8,
        out_precision: u8,
        clip_precision: u8,
        quality: u8,
        pitch_and_family: u8,
        face_name: [u16; 32],
    }

    /// `ENUMLOGFONTEXW` from wingdi.h.
    #[repr(C)]
    struct EnumLogFontExW {
        log_font: LogFontW,
        full_name: [u16; 64],
        style: [u16; 32],
        script: [u16; 32],
    }

    type GetDc = unsafe extern "system" fn(hwnd: Handle) -> Handle;
    type ReleaseDc = unsafe extern "system" fn(hwnd: Handle, hdc: Handle) -> i32;
    type FontEnumProc =
        unsafe extern "system" fn(*const EnumLogFontExW, *const c_void, u32, isize) -> i32;
    type EnumFontFamiliesExW =
        unsafe extern "system" fn(Handle, *const LogFontW, FontEnumProc, isize, u32) -> i32;

    #[link(name = "kernel32")]
    unsafe extern "system" {
        fn LoadLibraryW(file_name: *const u16) -> Handle;
        fn FreeLibrary(module: Handle) -> i32;
        fn GetProcAddress(module: Handle, name: *const c_char) -> *mut c_void;
    }

    struct Library(Handle);

    impl Library {
        fn load(path: &str) -> Option<Self> {
            let wide: Vec<u16> = path.encode_utf16().chain([0]).collect();
            let module = unsafe { LoadLibraryW(wide.as_ptr()) };

            (!module.is_null()).then_some(Library(module))
        }

        /// # Safety
        ///
        /// `F` must be the function pointer type of the exported symbol.
        unsafe fn symbol<F: Copy>(&self, name: &CStr) -> Option<F> {
            let address = unsafe { GetProcAddress(self.0, name.as_ptr()) };
            if address.is_null() {
                return None;
            }

            Some(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&address) })
        }
    }

    impl Drop for Library {
        fn drop(&mut self) {
            unsafe { FreeLibrary(self.0) };
        }
    }

    /// The screen device context, released on drop.
    struct ScreenDc {
        hdc: Handle,
        release: ReleaseDc,
    }

    impl Drop for ScreenDc {
        fn drop(&mut self) {
            unsafe { (self.release)(ptr::null_mut(), self.hdc) };
        }
    }

    pub(super) fn visit_families(mut visitor: Visitor<'_>) {
        let Some(user32) = Library::load(r"C:\Windows\System32\user32.dll") else {
            return;
        };
        let Some(gdi32) = Library::load(r"C:\Windows\System32\gdi32.dll") else {
            return;
        };

        let symbols = unsafe {
            (
                user32.symbol::<GetDc>(c"GetDC"),
                user32.symbol::<ReleaseDc>(c"ReleaseDC"),
                gdi32.symbol::<EnumFontFamiliesExW>(c"EnumFontFamiliesExW"),
            )
        };
        let (Some(get_dc), Some(release_dc), Some(enum_font_families)) = symbols else {
            #[cfg(feature = "log")]
            log::debug!("GDI font enumeration is unavailable");

            return;
        };

        let hdc = unsafe { get_dc(ptr::null_mut()) };
        if hdc.is_null() {
            return;
        }
        let screen = ScreenDc {
            hdc,
            release: release_dc,
        };

        let log_font = LogFontW {
            char_set: DEFAULT_CHARSET,
            ..Default::default()
        };

        unsafe {
            enum_font_families(
                screen.hdc,
                &log_font,
                enum_family,
                &mut visitor as *mut Visitor<'_> as isize,
                0,
            )
        };
    }

    unsafe extern "system" fn enum_family(
        elfe: *const EnumLogFontExW,
        _metric: *const c_void,
        _font_type: u32,
        lparam: isize,
    ) -> i32 {
        let visitor = unsafe { &mut *(lparam as *mut Visitor<'_>) };
        let Some(elfe) = (unsafe { elfe.as_ref() }) else {
            return 1;
        };

        let face = &elfe.log_font.face_name;
        let len = face.iter().position(|&c| c == 0).unwrap_or(face.len());
        let name = String::from_utf16_lossy(&face[..len]);

        // returning zero stops the enumeration
        match visitor(&name) {
            ControlFlow::Continue(()) => 1,
            ControlFlow::Break(()) => 0,
        }
    }
}
