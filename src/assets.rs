use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, RwLock};

use crate::beaker::BeakerGeometry;
use crate::error::AssetError;

/// Sprites the page draws. Acid is drawn differently from a free base even
/// though both are the same particle kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpriteKind {
    Beaker,
    ConjugateBase,
    Acid,
    Proton,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 4] = [
        SpriteKind::Beaker,
        SpriteKind::ConjugateBase,
        SpriteKind::Acid,
        SpriteKind::Proton,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpriteKind::Beaker => "beaker",
            SpriteKind::ConjugateBase => "conjugate_base",
            SpriteKind::Acid => "acid",
            SpriteKind::Proton => "proton",
        }
    }

    /// Accepts `"proton"` as well as `"proton.png"`.
    pub fn from_name(value: &str) -> Option<Self> {
        let stem = value.strip_suffix(".png").unwrap_or(value);
        SpriteKind::ALL.into_iter().find(|k| k.name() == stem)
    }

    pub fn url(self) -> String {
        format!("/assets/{}.png", self.name())
    }
}

/// URLs of the preloaded sprites, handed to the page after preload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SpriteSet {
    pub beaker: String,
    pub conjugate_base: String,
    pub acid: String,
    pub proton: String,
}

static SPRITE_CACHE: Lazy<RwLock<HashMap<SpriteKind, Arc<Vec<u8>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

const PROTON_PX: u32 = 12;
const BASE_PX: u32 = 28;

const PROTON_RED: [u8; 3] = [226, 72, 72];
const BASE_BLUE: [u8; 3] = [70, 130, 220];
const GLASS: [u8; 3] = [170, 200, 225];

/// Render every sprite once so later requests are served from the cache.
pub fn preload() -> Result<SpriteSet, AssetError> {
    for kind in SpriteKind::ALL {
        load_sprite(kind)?;
    }
    Ok(SpriteSet {
        beaker: SpriteKind::Beaker.url(),
        conjugate_base: SpriteKind::ConjugateBase.url(),
        acid: SpriteKind::Acid.url(),
        proton: SpriteKind::Proton.url(),
    })
}

/// PNG bytes for one sprite.
pub fn load_sprite(kind: SpriteKind) -> Result<Arc<Vec<u8>>, AssetError> {
    if let Some(cached) = SPRITE_CACHE
        .read()
        .map_err(|_| AssetError::CachePoisoned)?
        .get(&kind)
        .cloned()
    {
        return Ok(cached);
    }

    let png = Arc::new(encode_png(render(kind))?);
    let mut cache = SPRITE_CACHE.write().map_err(|_| AssetError::CachePoisoned)?;
    Ok(cache.entry(kind).or_insert(png).clone())
}

fn encode_png(img: RgbaImage) -> Result<Vec<u8>, AssetError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

fn render(kind: SpriteKind) -> RgbaImage {
    match kind {
        SpriteKind::Proton => {
            let mut img = disc(PROTON_PX, PROTON_RED);
            sign(&mut img, true);
            img
        }
        SpriteKind::ConjugateBase => {
            let mut img = disc(BASE_PX, BASE_BLUE);
            sign(&mut img, false);
            img
        }
        SpriteKind::Acid => acid(),
        SpriteKind::Beaker => beaker(BeakerGeometry::default()),
    }
}

/// Filled circle with a one pixel soft edge
fn disc(size: u32, rgb: [u8; 3]) -> RgbaImage {
    let r = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        let d = (dx * dx + dy * dy).sqrt();
        let alpha = (r - d).clamp(0.0, 1.0);
        Rgba([rgb[0], rgb[1], rgb[2], (alpha * 255.0) as u8])
    })
}

/// White '+' or '-' across the middle of a disc
fn sign(img: &mut RgbaImage, plus: bool) {
    let size = img.width();
    let mid = size / 2;
    let half = (size / 4).max(2);
    let white = Rgba([255, 255, 255, 255]);
    for i in (mid - half)..(mid + half) {
        img.put_pixel(i, mid, white);
        if size >= 16 {
            img.put_pixel(i, mid - 1, white);
        }
        if plus {
            img.put_pixel(mid, i, white);
        }
    }
}

/// Conjugate base carrying a proton on its upper right
fn acid() -> RgbaImage {
    let mut img = disc(BASE_PX, BASE_BLUE);
    let proton = disc(PROTON_PX, PROTON_RED);
    let offset = BASE_PX - PROTON_PX;
    for (x, y, px) in proton.enumerate_pixels() {
        if px[3] > 0 {
            img.put_pixel(offset + x, y, *px);
        }
    }
    img
}

/// Open-topped glass outline matching the beaker geometry
fn beaker(g: BeakerGeometry) -> RgbaImage {
    let w = g.width.max(1.0) as u32;
    let h = g.height.max(1.0) as u32;
    let wall = (g.wall.max(1.0) as u32).min(w / 2).min(h);
    RgbaImage::from_fn(w, h, |x, y| {
        let side = x < wall || x >= w - wall;
        let bottom = y >= h - wall;
        if side || bottom {
            Rgba([GLASS[0], GLASS[1], GLASS[2], 200])
        } else {
            Rgba([GLASS[0], GLASS[1], GLASS[2], 24])
        }
    })
}
