/*!
 * Cue-to-clip compilation.
 *
 * - `compiler`: generates and cleans renderer source for a cue
 * - `renderer`: runs the external renderer and locates its output
 */

pub use self::compiler::{find_scene_name, sanitize_code, SceneCompiler, SceneSource};
pub use self::renderer::{ManimRenderer, SceneRenderer};

pub mod compiler;
pub mod renderer;
