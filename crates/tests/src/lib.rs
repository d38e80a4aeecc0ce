
#[cfg(test)]
mod permission_tests;
#[cfg(test)]
mod polling_tests;
#[cfg(test)]
mod room_state_tests;
#[cfg(test)]
mod streaming_tests;
