mod logging;
mod property_chunking;
mod utils;
