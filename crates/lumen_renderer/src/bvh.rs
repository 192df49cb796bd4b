//! Bounding Volume Hierarchy over the faces of a mesh.
//!
//! Binary tree with a median split on the longest centroid axis. Leaves
//! store face indices; the caller supplies the per-face intersection test.

use lumen_math::{Aabb, Interval};

use crate::Ray;

/// Maximum faces per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with faces.
pub enum FaceBvh {
    /// Internal node with two children.
    Branch {
        left: Box<FaceBvh>,
        right: Box<FaceBvh>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of faces.
    Leaf { faces: Vec<usize>, bbox: Aabb },
    /// Empty node (mesh without faces).
    Empty,
}

impl FaceBvh {
    /// Build a BVH from the bounding box of every face.
    pub fn new(face_bounds: &[Aabb]) -> Self {
        if face_bounds.is_empty() {
            return FaceBvh::Empty;
        }
        Self::build((0..face_bounds.len()).collect(), face_bounds)
    }

    fn build(mut faces: Vec<usize>, face_bounds: &[Aabb]) -> Self {
        let n = faces.len();

        let bounds = faces.iter().fold(Aabb::EMPTY, |acc, &f| {
            Aabb::surrounding(&acc, &face_bounds[f])
        });

        if n <= LEAF_MAX_SIZE {
            return FaceBvh::Leaf {
                faces,
                bbox: bounds,
            };
        }

        // Choose split axis based on centroid spread
        let centroid_bounds = Aabb::from_point_cloud(faces.iter().map(|&f| face_bounds[f].centroid()));
        let axis = centroid_bounds.longest_axis();

        faces.sort_unstable_by(|&a, &b| {
            let a_val = face_bounds[a].centroid()[axis];
            let b_val = face_bounds[b].centroid()[axis];
            a_val
                .partial_cmp(&b_val)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = n / 2;
        let right_faces = faces.split_off(mid);

        FaceBvh::Branch {
            left: Box::new(Self::build(faces, face_bounds)),
            right: Box::new(Self::build(right_faces, face_bounds)),
            bbox: bounds,
        }
    }

    /// Find the nearest face hit inside `ray_t`.
    ///
    /// `test` is called with a face index and the interval still worth
    /// searching, and returns the hit parameter if that face is hit closer.
    /// Returns the parameter of the nearest hit.
    pub fn nearest<F>(&self, ray: &Ray, ray_t: Interval, test: &mut F) -> Option<f32>
    where
        F: FnMut(usize, Interval) -> Option<f32>,
    {
        match self {
            FaceBvh::Empty => None,

            FaceBvh::Leaf { faces, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let mut closest = None;
                for &face in faces {
                    let interval = ray_t.clip_max(closest.unwrap_or(ray_t.max));
                    if let Some(t) = test(face, interval) {
                        closest = Some(t);
                    }
                }
                closest
            }

            FaceBvh::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let left_t = left.nearest(ray, ray_t, test);

                // Only check right up to closest hit
                let right_max = left_t.unwrap_or(ray_t.max);
                let right_t = right.nearest(ray, ray_t.clip_max(right_max), test);

                right_t.or(left_t)
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            FaceBvh::Empty => Aabb::EMPTY,
            FaceBvh::Leaf { bbox, .. } => *bbox,
            FaceBvh::Branch { bbox, .. } => *bbox,
        }
    }
}
