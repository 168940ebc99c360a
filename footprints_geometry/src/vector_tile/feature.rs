//! A single vector tile feature and its geometry command stream.
//!
//! Geometry is encoded as `MoveTo` (1), `LineTo` (2) and `ClosePath` (7) commands with
//! zigzag encoded, delta coded parameters. See the Mapbox Vector Tile specification 2.1, §4.3.

use super::geometry_type::GeomType;
use crate::geo::{Geometry, LocalPoint};
use anyhow::{Context, Result, anyhow, bail, ensure};
use footprints_core::{
	Blob,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob, WIRE_LEN, WIRE_VARINT},
};
use log::trace;

const CMD_MOVE_TO: u64 = 1;
const CMD_LINE_TO: u64 = 2;
const CMD_CLOSE_PATH: u64 = 7;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTileFeature {
	pub id: Option<u64>,
	pub tag_ids: Vec<u32>,
	pub geom_type: GeomType,
	pub geom_data: Blob,
}

impl VectorTileFeature {
	pub fn read(reader: &mut dyn ValueReader<'_>) -> Result<VectorTileFeature> {
		let mut f = VectorTileFeature::default();

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, WIRE_VARINT) => f.id = Some(reader.read_varint().context("Failed to read feature ID")?),
				(2, WIRE_LEN) => f.tag_ids = reader.read_pbf_packed_uint32().context("Failed to read tag IDs")?,
				(3, WIRE_VARINT) => {
					f.geom_type = GeomType::from(reader.read_varint().context("Failed to read geometry type")?);
				}
				(4, WIRE_LEN) => f.geom_data = reader.read_pbf_blob().context("Failed to read geometry data")?,
				(f, w) => bail!("Unexpected combination of field number ({f}) and wire type ({w}) in feature"),
			}
		}

		Ok(f)
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new();

		if let Some(id) = self.id {
			writer.write_pbf_key(1, WIRE_VARINT)?;
			writer.write_varint(id).context("Failed to write feature ID")?;
		}

		if !self.tag_ids.is_empty() {
			writer.write_pbf_key(2, WIRE_LEN)?;
			writer
				.write_pbf_packed_uint32(&self.tag_ids)
				.context("Failed to write tag IDs")?;
		}

		writer.write_pbf_key(3, WIRE_VARINT)?;
		writer
			.write_varint(self.geom_type.as_u64())
			.context("Failed to write geometry type")?;

		if !self.geom_data.is_empty() {
			writer.write_pbf_key(4, WIRE_LEN)?;
			writer
				.write_pbf_blob(&self.geom_data)
				.context("Failed to write geometry data")?;
		}

		Ok(writer.into_blob())
	}

	/// Runs the command stream and returns the resulting paths in tile-local units.
	fn decode_paths(&self) -> Result<Vec<Vec<LocalPoint>>> {
		let mut reader = ValueReaderSlice::new(self.geom_data.as_slice());

		let mut paths: Vec<Vec<LocalPoint>> = Vec::new();
		let mut path: Vec<LocalPoint> = Vec::new();
		let mut x = 0i64;
		let mut y = 0i64;

		while reader.has_remaining() {
			let value = reader.read_varint().context("Failed to read geometry command")?;
			let command = value & 0x7;
			let count = value >> 3;

			match command {
				CMD_MOVE_TO | CMD_LINE_TO => {
					ensure!(
						command == CMD_MOVE_TO || !path.is_empty(),
						"LineTo command without a preceding MoveTo"
					);
					for _ in 0..count {
						if command == CMD_MOVE_TO && !path.is_empty() {
							paths.push(std::mem::take(&mut path));
						}
						let dx = reader.read_svarint().context("Failed to read x coordinate")?;
						let dy = reader.read_svarint().context("Failed to read y coordinate")?;
						x = x.checked_add(dx).ok_or_else(|| anyhow!("Geometry x coordinate overflow"))?;
						y = y.checked_add(dy).ok_or_else(|| anyhow!("Geometry y coordinate overflow"))?;
						path.push([x as f64, y as f64]);
					}
				}
				CMD_CLOSE_PATH => {
					ensure!(count == 1, "ClosePath command with count {count}");
					let Some(first) = path.first().copied() else {
						bail!("ClosePath command found on an empty path");
					};
					path.push(first);
				}
				_ => bail!("Unknown geometry command {command}"),
			}
		}

		if !path.is_empty() {
			paths.push(path);
		}

		Ok(paths)
	}

	/// Decodes the geometry in tile-local units.
	///
	/// Returns `None` for a polygon feature whose rings all have zero area.
	pub fn to_local_geometry(&self) -> Result<Option<Geometry<LocalPoint>>> {
		let paths = self.decode_paths()?;

		match self.geom_type {
			GeomType::Unknown => bail!("Unknown geometry type"),

			GeomType::Point => {
				ensure!(!paths.is_empty(), "Point features must have at least one point");
				let mut points = Vec::with_capacity(paths.len());
				for path in paths {
					ensure!(!path.is_empty(), "Point feature contains an empty MoveTo");
					points.extend(path);
				}
				Ok(Some(Geometry::from_points(points)))
			}

			GeomType::LineString => {
				ensure!(!paths.is_empty(), "LineString features must have at least one line");
				for line in &paths {
					ensure!(line.len() >= 2, "Each line must have at least two points");
				}
				Ok(Some(Geometry::from_lines(paths)))
			}

			GeomType::Polygon => {
				ensure!(!paths.is_empty(), "Polygon features must have at least one ring");
				let mut polygons: Vec<Vec<Vec<LocalPoint>>> = Vec::new();
				let mut current: Vec<Vec<LocalPoint>> = Vec::new();

				for ring in paths {
					ensure!(
						ring.len() >= 4,
						"Each ring must have at least four points (A,B,C,A), got {}",
						ring.len()
					);
					ensure!(
						ring.first() == ring.last(),
						"First and last point of a ring must be the same"
					);

					let area = ring_area(&ring);
					if area > 1e-14 {
						if !current.is_empty() {
							polygons.push(std::mem::take(&mut current));
						}
						current.push(ring);
					} else if area < -1e-14 {
						if current.is_empty() {
							trace!("dropping inner ring without a preceding outer ring");
						} else {
							current.push(ring);
						}
					} else {
						trace!("dropping ring with zero area");
					}
				}

				if !current.is_empty() {
					polygons.push(current);
				}

				if polygons.is_empty() {
					return Ok(None);
				}
				Ok(Some(Geometry::from_polygons(polygons)))
			}
		}
	}

	/// Encodes local geometry into a feature.
	///
	/// Coordinates are rounded to whole tile units. Rings must be closed, the closing
	/// point is replaced by a `ClosePath` command.
	pub fn from_geometry(tag_ids: Vec<u32>, geometry: &Geometry<LocalPoint>) -> Result<VectorTileFeature> {
		let mut encoder = CommandEncoder::default();

		let geom_type = match geometry {
			Geometry::Point(p) => {
				encoder.points(std::slice::from_ref(p))?;
				GeomType::Point
			}
			Geometry::MultiPoint(ps) => {
				encoder.points(ps)?;
				GeomType::Point
			}
			Geometry::LineString(l) => {
				encoder.path(l, false)?;
				GeomType::LineString
			}
			Geometry::MultiLineString(ls) => {
				for l in ls {
					encoder.path(l, false)?;
				}
				GeomType::LineString
			}
			Geometry::Polygon(rings) => {
				for ring in rings {
					encoder.path(ring, true)?;
				}
				GeomType::Polygon
			}
			Geometry::MultiPolygon(polygons) => {
				for ring in polygons.iter().flatten() {
					encoder.path(ring, true)?;
				}
				GeomType::Polygon
			}
		};

		Ok(VectorTileFeature {
			id: None,
			tag_ids,
			geom_type,
			geom_data: encoder.writer.into_blob(),
		})
	}
}

/// Signed shoelace area in tile space. Positive for outer rings (clockwise with y pointing down).
fn ring_area(ring: &[LocalPoint]) -> f64 {
	let Some(mut p2) = ring.last() else {
		return 0.0;
	};
	let mut sum = 0.0;
	for p1 in ring {
		sum += (p2[0] - p1[0]) * (p1[1] + p2[1]);
		p2 = p1;
	}
	sum
}

#[derive(Default)]
struct CommandEncoder {
	writer: ValueWriterBlob,
	cursor: (i64, i64),
}

impl CommandEncoder {
	fn command(&mut self, id: u64, count: usize) -> Result<()> {
		self.writer.write_varint(((count as u64) << 3) | id)
	}

	fn point(&mut self, point: &LocalPoint) -> Result<()> {
		let x = point[0].round() as i64;
		let y = point[1].round() as i64;
		self.writer.write_svarint(x - self.cursor.0)?;
		self.writer.write_svarint(y - self.cursor.1)?;
		self.cursor = (x, y);
		Ok(())
	}

	fn points(&mut self, points: &[LocalPoint]) -> Result<()> {
		self.command(CMD_MOVE_TO, points.len())?;
		for point in points {
			self.point(point)?;
		}
		Ok(())
	}

	fn path(&mut self, path: &[LocalPoint], close: bool) -> Result<()> {
		let path = if close {
			ensure!(path.len() >= 4, "Rings must have at least four points");
			ensure!(path.first() == path.last(), "Rings must be closed");
			&path[..path.len() - 1]
		} else {
			path
		};
		let Some((first, rest)) = path.split_first() else {
			return Ok(());
		};

		self.command(CMD_MOVE_TO, 1)?;
		self.point(first)?;
		if !rest.is_empty() {
			self.command(CMD_LINE_TO, rest.len())?;
			for point in rest {
				self.point(point)?;
			}
		}
		if close {
			self.command(CMD_CLOSE_PATH, 1)?;
		}
		Ok(())
	}
}
