use std::fmt;
use std::os::raw::{c_char, c_double, c_int, c_ulong};
use std::path::Path;

use libloading::Library;
use once_cell::sync::OnceCell;

use super::{DeviceError, Spectrometer};

/// Upper bound on device indices probed by the legacy wrapper API.
const MAX_DEVICES: c_int = 32;
const TEXT_BUFFER_LEN: usize = 80;

#[cfg(target_os = "windows")]
const DEFAULT_LIBRARY: &str = "SeaBreeze.dll";
#[cfg(target_os = "macos")]
const DEFAULT_LIBRARY: &str = "libseabreeze.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DEFAULT_LIBRARY: &str = "libseabreeze.so";

// ---------------------------------------------------------------------------
// Vendor API table
// ---------------------------------------------------------------------------

type IndexFn = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;
type TextFn = unsafe extern "C" fn(c_int, *mut c_int, *mut c_char, c_int) -> c_int;
type DoublesFn = unsafe extern "C" fn(c_int, *mut c_int, *mut c_double, c_int) -> c_int;
type ErrorStringFn = unsafe extern "C" fn(c_int, *mut c_char, c_int) -> c_int;
type SetIntegrationFn = unsafe extern "C" fn(c_int, *mut c_int, c_ulong);

struct SeaBreezeApi {
    #[allow(dead_code)]
    lib: Library,
    open_spectrometer: IndexFn,
    close_spectrometer: IndexFn,
    get_model: TextFn,
    get_serial_number: TextFn,
    get_error_string: ErrorStringFn,
    set_integration_time_microsec: SetIntegrationFn,
    get_formatted_spectrum_length: IndexFn,
    get_formatted_spectrum: DoublesFn,
    get_wavelengths: DoublesFn,
}

macro_rules! symbol {
    ($lib:expr, $name:literal, $ty:ty) => {
        *$lib
            .get::<$ty>(concat!($name, "\0").as_bytes())
            .map_err(|_| DeviceError::MissingSymbol($name))?
    };
}

impl SeaBreezeApi {
    fn load(path: &str) -> Result<Self, DeviceError> {
        // Safety: loading runs the library's initialisers; SeaBreeze has none
        // with preconditions.
        let lib = unsafe { Library::new(path) }.map_err(|e| DeviceError::LibraryLoad {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        // Safety: signatures follow SeaBreezeWrapper.h. Each symbol is copied
        // out before `lib` moves into the table.
        unsafe {
            let open_spectrometer = symbol!(lib, "seabreeze_open_spectrometer", IndexFn);
            let close_spectrometer = symbol!(lib, "seabreeze_close_spectrometer", IndexFn);
            let get_model = symbol!(lib, "seabreeze_get_model", TextFn);
            let get_serial_number = symbol!(lib, "seabreeze_get_serial_number", TextFn);
            let get_error_string = symbol!(lib, "seabreeze_get_error_string", ErrorStringFn);
            let set_integration_time_microsec =
                symbol!(lib, "seabreeze_set_integration_time_microsec", SetIntegrationFn);
            let get_formatted_spectrum_length =
                symbol!(lib, "seabreeze_get_formatted_spectrum_length", IndexFn);
            let get_formatted_spectrum = symbol!(lib, "seabreeze_get_formatted_spectrum", DoublesFn);
            let get_wavelengths = symbol!(lib, "seabreeze_get_wavelengths", DoublesFn);
            Ok(Self {
                lib,
                open_spectrometer,
                close_spectrometer,
                get_model,
                get_serial_number,
                get_error_string,
                set_integration_time_microsec,
                get_formatted_spectrum_length,
                get_formatted_spectrum,
                get_wavelengths,
            })
        }
    }

    /// The library is loaded once per process; later calls reuse it.
    fn instance(path: Option<&Path>) -> Result<&'static SeaBreezeApi, DeviceError> {
        static API: OnceCell<SeaBreezeApi> = OnceCell::new();
        API.get_or_try_init(|| {
            let path = path
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_LIBRARY.to_string());
            Self::load(&path)
        })
    }

    fn error_message(&self, code: c_int) -> String {
        let mut buf = [0 as c_char; TEXT_BUFFER_LEN];
        unsafe { (self.get_error_string)(code, buf.as_mut_ptr(), buf.len() as c_int) };
        c_buffer_to_string(&buf)
    }

    fn check(&self, call: &'static str, code: c_int) -> Result<(), DeviceError> {
        if code == 0 {
            Ok(())
        } else {
            Err(DeviceError::Vendor {
                call,
                code,
                message: self.error_message(code),
            })
        }
    }

    fn open(&self, index: c_int) -> Result<(), DeviceError> {
        let mut err: c_int = 0;
        let rc = unsafe { (self.open_spectrometer)(index, &mut err) };
        self.check("seabreeze_open_spectrometer", if rc != 0 && err == 0 { rc } else { err })
    }

    fn close(&self, index: c_int) -> Result<(), DeviceError> {
        let mut err: c_int = 0;
        unsafe { (self.close_spectrometer)(index, &mut err) };
        self.check("seabreeze_close_spectrometer", err)
    }

    fn text(
        &self,
        call: &'static str,
        f: TextFn,
        index: c_int,
    ) -> Result<String, DeviceError> {
        let mut err: c_int = 0;
        let mut buf = [0 as c_char; TEXT_BUFFER_LEN];
        unsafe { f(index, &mut err, buf.as_mut_ptr(), buf.len() as c_int) };
        self.check(call, err)?;
        Ok(c_buffer_to_string(&buf))
    }

    fn model(&self, index: c_int) -> Result<String, DeviceError> {
        self.text("seabreeze_get_model", self.get_model, index)
    }

    fn serial_number(&self, index: c_int) -> Result<String, DeviceError> {
        self.text("seabreeze_get_serial_number", self.get_serial_number, index)
    }

    fn spectrum_length(&self, index: c_int) -> Result<usize, DeviceError> {
        let mut err: c_int = 0;
        let len = unsafe { (self.get_formatted_spectrum_length)(index, &mut err) };
        self.check("seabreeze_get_formatted_spectrum_length", err)?;
        if len <= 0 {
            return Err(DeviceError::EmptyRead);
        }
        Ok(len as usize)
    }

    fn read_doubles(
        &self,
        call: &'static str,
        f: DoublesFn,
        index: c_int,
        len: usize,
    ) -> Result<Vec<f64>, DeviceError> {
        let mut err: c_int = 0;
        let mut buf = vec![0.0 as c_double; len];
        let written = unsafe { f(index, &mut err, buf.as_mut_ptr(), len as c_int) };
        self.check(call, err)?;
        if written >= 0 && (written as usize) != len {
            return Err(DeviceError::LengthMismatch {
                expected: len,
                actual: written as usize,
            });
        }
        Ok(buf)
    }
}

fn c_buffer_to_string(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).trim().to_string()
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// A connected spectrometer found during enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    pub index: i32,
    pub model: String,
    pub serial: String,
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.model, self.serial)
    }
}

/// Probe device indices until one fails to open.
pub fn list_devices(library: Option<&Path>) -> Result<Vec<DeviceDescriptor>, DeviceError> {
    let api = SeaBreezeApi::instance(library)?;
    let mut found = Vec::new();
    for index in 0..MAX_DEVICES {
        if api.open(index).is_err() {
            break;
        }
        let descriptor = DeviceDescriptor {
            index,
            model: api.model(index).unwrap_or_else(|_| "Unknown".to_string()),
            serial: api.serial_number(index).unwrap_or_default(),
        };
        if let Err(e) = api.close(index) {
            log::debug!("closing {descriptor} after probe: {e}");
        }
        found.push(descriptor);
    }
    Ok(found)
}

// ---------------------------------------------------------------------------
// Hardware device
// ---------------------------------------------------------------------------

/// An open SeaBreeze spectrometer. The session is closed on drop.
pub struct SeaBreezeSpectrometer {
    api: &'static SeaBreezeApi,
    index: c_int,
    name: String,
    pixels: usize,
}

impl SeaBreezeSpectrometer {
    pub fn open(library: Option<&Path>, descriptor: &DeviceDescriptor) -> Result<Self, DeviceError> {
        let api = SeaBreezeApi::instance(library)?;
        let index = descriptor.index as c_int;
        api.open(index)?;
        let pixels = match api.spectrum_length(index) {
            Ok(n) => n,
            Err(e) => {
                let _ = api.close(index);
                return Err(e);
            }
        };
        Ok(Self {
            api,
            index,
            name: descriptor.to_string(),
            pixels,
        })
    }
}

impl Spectrometer for SeaBreezeSpectrometer {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelengths(&mut self) -> Result<Vec<f64>, DeviceError> {
        self.api.read_doubles(
            "seabreeze_get_wavelengths",
            self.api.get_wavelengths,
            self.index,
            self.pixels,
        )
    }

    fn intensities(&mut self) -> Result<Vec<f64>, DeviceError> {
        self.api.read_doubles(
            "seabreeze_get_formatted_spectrum",
            self.api.get_formatted_spectrum,
            self.index,
            self.pixels,
        )
    }

    fn set_integration_time_micros(&mut self, micros: u64) -> Result<(), DeviceError> {
        let mut err: c_int = 0;
        unsafe { (self.api.set_integration_time_microsec)(self.index, &mut err, micros as c_ulong) };
        self.api.check("seabreeze_set_integration_time_microsec", err)
    }
}

impl Drop for SeaBreezeSpectrometer {
    fn drop(&mut self) {
        if let Err(e) = self.api.close(self.index) {
            log::warn!("closing {}: {e}", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_buffer_stops_at_nul() {
        let mut buf = [0 as c_char; 8];
        for (slot, b) in buf.iter_mut().zip(b"USB4000\0x") {
            *slot = *b as c_char;
        }
        assert_eq!(c_buffer_to_string(&buf), "USB4000");
    }

    #[test]
    fn descriptor_display_joins_model_and_serial() {
        let d = DeviceDescriptor {
            index: 0,
            model: "USB2000+".into(),
            serial: "USB2+F01234".into(),
        };
        assert_eq!(d.to_string(), "USB2000+ USB2+F01234");
    }

    #[test]
    fn missing_library_is_reported() {
        let err = list_devices(Some(Path::new("/nonexistent/libseabreeze-missing.so")));
        assert!(matches!(err, Err(DeviceError::LibraryLoad { .. })));
    }
}
