/// Magenta marks transparent pixels in the character atlas.
pub const COLOR_KEY: [u8; 3] = [255, 0, 255];

/// Destination surface extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Copies a rectangular region of `src` into `frame` at `(dst_x,
/// dst_y)`, both RGBA8 row-major. Rows and columns outside either
/// surface clip away instead of wrapping. With a color key, source
/// pixels whose RGB equals the key are skipped and the destination
/// shows through.
#[allow(clippy::too_many_arguments)]
pub(crate) fn blit_region(
    frame: &mut [u8],
    frame_width: u32,
    frame_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    src_x: u32,
    src_y: u32,
    region_width: u32,
    region_height: u32,
    dst_x: i32,
    dst_y: i32,
    color_key: Option<[u8; 3]>,
) {
    for row in 0..region_height {
        let sy = src_y + row;
        if sy >= src_height {
            break;
        }
        let fy = dst_y + row as i32;
        if fy < 0 {
            continue;
        }
        let fy = fy as u32;
        if fy >= frame_height {
            break;
        }
        for col in 0..region_width {
            let sx = src_x + col;
            if sx >= src_width {
                break;
            }
            let fx = dst_x + col as i32;
            if fx < 0 {
                continue;
            }
            let fx = fx as u32;
            if fx >= frame_width {
                break;
            }

            let src_index = (sy as usize * src_width as usize + sx as usize) * 4;
            let pixel = &src[src_index..src_index + 4];
            if let Some(key) = color_key {
                if pixel[..3] == key {
                    continue;
                }
            }
            let dst_index = (fy as usize * frame_width as usize + fx as usize) * 4;
            frame[dst_index..dst_index + 4].copy_from_slice(pixel);
        }
    }
}

/// Blits a whole source surface; the map surface scrolls through the
/// frame this way.
pub(crate) fn blit_rgba(
    frame: &mut [u8],
    frame_width: u32,
    frame_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    dst_x: i32,
    dst_y: i32,
) {
    blit_region(
        frame,
        frame_width,
        frame_height,
        src,
        src_width,
        src_height,
        0,
        0,
        src_width,
        src_height,
        dst_x,
        dst_y,
        None,
    );
}
