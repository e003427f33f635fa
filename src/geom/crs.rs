use std::{fmt, path::Path, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// An AUTHORITY directly followed by the closing bracket of the root node.
static ROOT_AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"AUTHORITY\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]\s*\]\s*$"#).expect("valid regex")
});
static UTM_ZONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)UTM[ _]zone[ _](\d{1,2})\s*,?\s*([NS])").expect("valid regex")
});
static WEB_MERCATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)web[ _]mercator|pseudo[ _-]mercator|mercator_auxiliary_sphere").expect("valid regex")
});

/// PSAD56 ellipsoid and its 3-parameter shift to WGS 84 (Peru).
const PSAD56: &str = "+ellps=intl +towgs84=-288,175,-376,0,0,0,0";

/// A coordinate reference system identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs(u32);

impl Crs {
    /// WGS 84 longitude/latitude.
    pub const WGS84: Crs = Crs(4326);
    /// WGS 84 / UTM zone 18S, the metric CRS covering most of Peru.
    pub const UTM_18S: Crs = Crs(32718);

    #[inline] pub fn epsg(code: u32) -> Self { Self(code) }

    #[inline] pub fn code(&self) -> u32 { self.0 }

    /// True for longitude/latitude systems (coordinates in degrees).
    #[inline]
    pub fn is_geographic(&self) -> bool { matches!(self.0, 4326 | 4269 | 4248) }

    /// PROJ.4 definition, or a projection error for codes we cannot build.
    pub fn proj4(&self) -> Result<String> {
        let def = match self.0 {
            4326 => "+proj=longlat +datum=WGS84".to_string(),
            4269 => "+proj=longlat +datum=NAD83".to_string(),
            4248 => format!("+proj=longlat {PSAD56}"),
            3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m".to_string(),
            code @ 32601..=32660 => format!("+proj=utm +zone={} +datum=WGS84 +units=m", code - 32600),
            code @ 32701..=32760 => format!("+proj=utm +zone={} +south +datum=WGS84 +units=m", code - 32700),
            code @ 24877..=24879 => format!("+proj=utm +zone={} +south {PSAD56} +units=m", code - 24860),
            code => return Err(Error::Projection(format!("unsupported CRS EPSG:{code}"))),
        };
        Ok(format!("{def} +no_defs +type=crs"))
    }

    /// Identify a CRS from ESRI/OGC WKT text (the contents of a `.prj` file).
    pub fn from_wkt(wkt: &str) -> Option<Self> {
        // Inner AUTHORITY nodes name the datum, unit or base CRS, never the whole CRS.
        if let Some(code) = ROOT_AUTHORITY.captures(wkt)
            .and_then(|caps| caps[1].parse().ok()) {
            return Some(Self(code));
        }

        let upper = wkt.to_ascii_uppercase();
        let psad = upper.contains("PSAD") || upper.contains("PROVISIONAL_S_AMERICAN");

        if upper.trim_start().starts_with("PROJCS") || upper.trim_start().starts_with("PROJCRS") {
            if WEB_MERCATOR.is_match(wkt) { return Some(Self(3857)) }
            let caps = UTM_ZONE.captures(wkt)?;
            let zone: u32 = caps[1].parse().ok().filter(|z| (1..=60).contains(z))?;
            let south = caps[2].eq_ignore_ascii_case("S");
            return match (psad, south) {
                (true, true) if (17..=19).contains(&zone) => Some(Self(24860 + zone)),
                (true, _) => None,
                (false, true) => Some(Self(32700 + zone)),
                (false, false) => Some(Self(32600 + zone)),
            };
        }

        if psad { return Some(Self(4248)) }
        if upper.contains("NORTH_AMERICAN_1983") || upper.contains("NAD83") { return Some(Self(4269)) }
        if upper.contains("WGS_1984") || upper.contains("WGS 84") || upper.contains("WGS_84") {
            return Some(Self::WGS84);
        }
        None
    }

    /// Read the `.prj` sidecar of a shapefile, if present and recognizable.
    pub fn from_prj_sidecar(shp_path: &Path) -> Option<Self> {
        let prj = shp_path.with_extension("prj");
        let wkt = std::fs::read_to_string(&prj).ok()?;
        let crs = Self::from_wkt(&wkt);
        if crs.is_none() {
            log::warn!("unrecognized CRS in {}", prj.display());
        }
        crs
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}
