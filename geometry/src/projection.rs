use crate::Matrix4;

/// A projection that maps layout pixels to clip space.
///
/// The origin is at the left / top of the viewport, Y grows downwards. Depth covers -1 to 1 in
/// layout space.
pub fn orthographic_projection(width: f32, height: f32) -> Matrix4 {
    Matrix4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}
