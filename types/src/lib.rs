pub mod collections;
pub mod combined;
pub mod config;
pub mod nonstandard;

pub mod phase0 {
    pub mod consts;
    pub mod containers;
    pub mod primitives;
}

pub mod bellatrix {
    pub mod consts;
    pub mod containers;
    pub mod primitives;

    mod container_impls;
}

pub mod capella {
    pub mod consts;
    pub mod containers;

    mod container_impls;
}

pub mod deneb {
    pub mod containers;
    pub mod primitives;

    mod container_impls;
}
