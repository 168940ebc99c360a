//! Property values as stored in a layer's value table.

use crate::geo::GeoValue;
use anyhow::{Context, Result, anyhow, bail};
use footprints_core::{
	Blob,
	io::{ValueReader, ValueWriter, ValueWriterBlob, WIRE_FIXED32, WIRE_FIXED64, WIRE_LEN, WIRE_VARINT},
};

pub trait GeoValuePbf<'a> {
	fn read(reader: &mut dyn ValueReader<'a>) -> Result<GeoValue>;
	fn to_blob(&self) -> Result<Blob>;
}

impl<'a> GeoValuePbf<'a> for GeoValue {
	fn read(reader: &mut dyn ValueReader<'a>) -> Result<GeoValue> {
		let mut value: Option<GeoValue> = None;

		while reader.has_remaining() {
			value = Some(match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_LEN) => GeoValue::String(reader.read_pbf_string().context("Failed to read string value")?),
				(2, WIRE_FIXED32) => GeoValue::from(reader.read_f32().context("Failed to read float value")?),
				(3, WIRE_FIXED64) => GeoValue::Double(reader.read_f64().context("Failed to read double value")?),
				(4, WIRE_VARINT) => GeoValue::Int(reader.read_varint().context("Failed to read int value")? as i64),
				(5, WIRE_VARINT) => GeoValue::UInt(reader.read_varint().context("Failed to read uint value")?),
				(6, WIRE_VARINT) => GeoValue::Int(reader.read_svarint().context("Failed to read sint value")?),
				(7, WIRE_VARINT) => GeoValue::Bool(reader.read_varint().context("Failed to read bool value")? != 0),
				(f, w) => bail!("Unexpected combination of field number ({f}) and wire type ({w}) in value"),
			});
		}

		value.ok_or_else(|| anyhow!("Value message is empty"))
	}

	fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		match self {
			GeoValue::String(s) => {
				writer.write_pbf_key(1, WIRE_LEN)?;
				writer.write_pbf_string(s).context("Failed to write string value")?;
			}
			GeoValue::Double(v) => {
				writer.write_pbf_key(3, WIRE_FIXED64)?;
				writer.write_f64(*v).context("Failed to write double value")?;
			}
			GeoValue::UInt(v) => {
				writer.write_pbf_key(5, WIRE_VARINT)?;
				writer.write_varint(*v).context("Failed to write uint value")?;
			}
			GeoValue::Int(v) => {
				writer.write_pbf_key(6, WIRE_VARINT)?;
				writer.write_svarint(*v).context("Failed to write sint value")?;
			}
			GeoValue::Bool(v) => {
				writer.write_pbf_key(7, WIRE_VARINT)?;
				writer.write_varint(u64::from(*v)).context("Failed to write bool value")?;
			}
			GeoValue::Null => bail!("Null can not be stored in a vector tile"),
		}

		Ok(writer.into_blob())
	}
}
