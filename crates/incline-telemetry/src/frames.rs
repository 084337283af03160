//! Typed views of the board's wire messages, and a session wrapper that
//! speaks them.

use incline_link::{ByteChannel, LinkError, Session};
use incline_wire::{FieldType, FieldValue, FrameError, FrameSchema};

/// Number of 16-bit sensor channels in one measurement frame.
pub const SENSOR_CHANNELS: usize = 10;

/// Handshake layout: one online flag per sensor.
pub fn handshake_schema() -> FrameSchema {
    FrameSchema::new(vec![FieldType::Bool, FieldType::Bool])
}

/// Measurement layout: millisecond timestamp followed by the ten raw sensor
/// counts. 24 bytes on the wire.
pub fn measurement_schema() -> FrameSchema {
    let mut fields = vec![FieldType::U32];
    fields.extend(std::iter::repeat(FieldType::I16).take(SENSOR_CHANNELS));
    FrameSchema::new(fields)
}

/// Sensor availability reported by the board at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorStatus {
    pub adxl_online: bool,
    pub mpu_online: bool,
}

impl SensorStatus {
    pub fn any_online(&self) -> bool {
        self.adxl_online || self.mpu_online
    }

    fn from_values(values: &[FieldValue]) -> Result<Self, FrameError> {
        match values {
            [FieldValue::Bool(adxl), FieldValue::Bool(mpu)] => Ok(Self {
                adxl_online: *adxl,
                mpu_online: *mpu,
            }),
            _ => Err(FrameError::ValueCount {
                expected: 2,
                got: values.len(),
            }),
        }
    }
}

/// One undecoded measurement frame: the board's timestamp and raw counts,
/// ordered ADXL accel x/y/z, MPU accel x/y/z, MPU gyro x/y/z, MPU temp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMeasurement {
    pub timestamp_ms: u32,
    pub readings: [i16; SENSOR_CHANNELS],
}

impl RawMeasurement {
    fn from_values(values: &[FieldValue]) -> Result<Self, FrameError> {
        if values.len() != SENSOR_CHANNELS + 1 {
            return Err(FrameError::ValueCount {
                expected: SENSOR_CHANNELS + 1,
                got: values.len(),
            });
        }

        let timestamp_ms = match values[0] {
            FieldValue::U32(ms) => ms,
            other => {
                return Err(FrameError::TypeMismatch {
                    index: 0,
                    expected: FieldType::U32.label(),
                    got: other.field_type().label(),
                })
            }
        };

        let mut readings = [0i16; SENSOR_CHANNELS];
        for (i, value) in values[1..].iter().enumerate() {
            readings[i] = match value {
                FieldValue::I16(v) => *v,
                other => {
                    return Err(FrameError::TypeMismatch {
                        index: i + 1,
                        expected: FieldType::I16.label(),
                        got: other.field_type().label(),
                    })
                }
            };
        }

        Ok(Self {
            timestamp_ms,
            readings,
        })
    }
}

/// A [`Session`] specialized to the board's message set.
///
/// Schemas are built once; every exchange with the board goes through here so
/// the frame layouts live in exactly one place.
pub struct TelemetryLink<C> {
    session: Session<C>,
    handshake: FrameSchema,
    measurement: FrameSchema,
    flag: FrameSchema,
    count: FrameSchema,
    cadence: FrameSchema,
}

impl<C: ByteChannel> TelemetryLink<C> {
    pub fn new(session: Session<C>) -> Self {
        Self {
            session,
            handshake: handshake_schema(),
            measurement: measurement_schema(),
            flag: FrameSchema::new(vec![FieldType::Bool]),
            count: FrameSchema::new(vec![FieldType::U8]),
            cadence: FrameSchema::new(vec![FieldType::U32]),
        }
    }

    /// The underlying frame session.
    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    /// Read the startup handshake reporting which sensors are online.
    pub fn read_status(&mut self) -> Result<SensorStatus, LinkError> {
        let values = self.session.receive(&self.handshake)?;
        Ok(SensorStatus::from_values(&values)?)
    }

    /// Read one measurement frame.
    pub fn read_measurement(&mut self) -> Result<RawMeasurement, LinkError> {
        let values = self.session.receive(&self.measurement)?;
        Ok(RawMeasurement::from_values(&values)?)
    }

    /// Tell the board whether this session will run the calibration
    /// procedure.
    pub fn send_calibrate_flag(&mut self, run: bool) -> Result<(), LinkError> {
        self.session.send(&self.flag, &[FieldValue::Bool(run)])
    }

    /// Tell the board how many frames to stream per calibration phase.
    pub fn send_sample_count(&mut self, count: u8) -> Result<(), LinkError> {
        self.session.send(&self.count, &[FieldValue::U8(count)])
    }

    /// Trigger the board to stream one calibration phase's frames.
    pub fn send_phase_trigger(&mut self) -> Result<(), LinkError> {
        self.session.send(&self.flag, &[FieldValue::Bool(true)])
    }

    /// Send the interval between measurement frames. The board does not
    /// start streaming until this arrives.
    pub fn send_sample_interval(&mut self, interval_ms: u32) -> Result<(), LinkError> {
        self.session
            .send(&self.cadence, &[FieldValue::U32(interval_ms)])
    }
}
