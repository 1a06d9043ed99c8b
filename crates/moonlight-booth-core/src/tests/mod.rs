mod booth;
mod camera;
mod compositor;
mod strip;
mod support;
