use byteorder::LittleEndian;
use ethereum_types::H256;

pub const BYTES_PER_CHUNK: usize = H256::len_bytes();

pub type Endianness = LittleEndian;
