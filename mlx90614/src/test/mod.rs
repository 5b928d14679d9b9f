
pub(crate) use smbus_mock::{
    mock_mlx90614_at_address, MockDelay, MockError, MockSensorBus, Operation,
};
