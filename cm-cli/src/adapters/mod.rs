//! Runtime backends

mod docker;

pub use docker::DockerRuntime;
