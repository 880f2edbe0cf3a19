//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements    | Connects to                    |
//! |-----------------|---------------|--------------------------------|
//! | `hardware`      | PulsePort     | ESP32 LEDC (CKP outputs)       |
//! |                 | IndicatorPort | Status LED GPIO                |
//! |                 | InputPort     | Operator input GPIOs           |
//! | `log_sink`      | EventSink     | Serial log output              |
//! | `callback_sink` | EventSink     | Transport notification hook    |
//! | `time`          | —             | ESP32 system timer             |

pub mod callback_sink;
pub mod hardware;
pub mod log_sink;
pub mod time;
