pub mod place_source;
