//! Cross-subsystem integration flows.

#[cfg(test)]
mod support;

#[cfg(test)]
mod delivery;
#[cfg(test)]
mod gateway;
#[cfg(test)]
mod live_channel;
#[cfg(test)]
mod replication;
