use glow::HasContext;
use scenecraft_gui_lib::mesh::{MeshData, FLOOR_Y};

use super::camera::ArcBallCamera;

/// Viewport rectangle [x, y, width, height] in pixels
pub struct RenderParams {
    pub viewport: [f32; 4],
    pub bg_color: [u8; 3],
}

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
}

pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    floor: Option<GpuLines>,
    model: Option<GpuMesh>,
    /// Revision of the mesh currently on the GPU
    model_version: Option<u64>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG)?;
        let floor = upload_lines(gl, &floor_grid(6, 0.25)).ok();
        Ok(Self {
            mesh_program,
            line_program,
            floor,
            model: None,
            model_version: None,
        })
    }

    /// Replace the model on the GPU when `version` changed.
    pub fn sync_model(&mut self, gl: &glow::Context, mesh: Option<&MeshData>, version: u64) {
        if self.model_version == Some(version) {
            return;
        }
        self.model_version = Some(version);

        if let Some(old) = self.model.take() {
            unsafe {
                gl.delete_vertex_array(old.vao);
                gl.delete_buffer(old.vbo);
                gl.delete_buffer(old.ibo);
            }
        }
        if let Some(mesh) = mesh {
            match upload_mesh(gl, mesh) {
                Ok(gpu) => self.model = Some(gpu),
                Err(e) => tracing::error!("mesh upload failed: {e}"),
            }
        }
    }

    pub fn paint(&self, gl: &glow::Context, camera: &ArcBallCamera, params: &RenderParams) {
        let [x, y, w, h] = params.viewport;
        let vp = camera.view_projection(w / h.max(1.0));

        unsafe {
            gl.viewport(x as i32, y as i32, w as i32, h as i32);
            gl.scissor(x as i32, y as i32, w as i32, h as i32);
            gl.enable(glow::SCISSOR_TEST);

            let [r, g, b] = params.bg_color.map(|c| c as f32 / 255.0);
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            if let Some(floor) = &self.floor {
                gl.use_program(Some(self.line_program));
                set_uniform_mat4(gl, self.line_program, "u_mvp", &vp);
                gl.bind_vertex_array(Some(floor.vao));
                gl.draw_arrays(glow::LINES, 0, floor.vertex_count);
            }

            if let Some(model) = &self.model {
                gl.use_program(Some(self.mesh_program));
                set_uniform_mat4(gl, self.mesh_program, "u_mvp", &vp);
                let light_dir = glam::Vec3::new(0.4, 0.8, 0.5).normalize();
                let loc = gl.get_uniform_location(self.mesh_program, "u_light_dir");
                gl.uniform_3_f32(loc.as_ref(), light_dir.x, light_dir.y, light_dir.z);

                gl.bind_vertex_array(Some(model.vao));
                gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(model.ibo));
                gl.draw_elements(glow::TRIANGLES, model.index_count, glow::UNSIGNED_INT, 0);
            }

            gl.bind_vertex_array(None);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            gl.delete_program(self.mesh_program);
            gl.delete_program(self.line_program);
            if let Some(floor) = self.floor.take() {
                gl.delete_vertex_array(floor.vao);
                gl.delete_buffer(floor.vbo);
            }
            if let Some(model) = self.model.take() {
                gl.delete_vertex_array(model.vao);
                gl.delete_buffer(model.vbo);
                gl.delete_buffer(model.ibo);
            }
        }
    }
}

/// Square grid on the floor plane: [pos(3), color(4)] per vertex.
fn floor_grid(half_cells: i32, cell: f32) -> Vec<f32> {
    let extent = half_cells as f32 * cell;
    let color = [0.45, 0.45, 0.5, 1.0];
    let mut out = Vec::new();
    for i in -half_cells..=half_cells {
        let t = i as f32 * cell;
        for [x0, z0, x1, z1] in [[t, -extent, t, extent], [-extent, t, extent, t]] {
            out.extend_from_slice(&[x0, FLOOR_Y, z0]);
            out.extend_from_slice(&color);
            out.extend_from_slice(&[x1, FLOOR_Y, z1]);
            out.extend_from_slice(&color);
        }
    }
    out
}

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(&data.vertices), glow::STATIC_DRAW);

        let stride = 9 * 4;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            as_bytes(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);
        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

fn upload_lines(gl: &glow::Context, vertices: &[f32]) -> Result<GpuLines, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(vertices), glow::STATIC_DRAW);

        let stride = 7 * 4;
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);
        Ok(GpuLines {
            vao,
            vbo,
            vertex_count: (vertices.len() / 7) as i32,
        })
    }
}

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;
        let mut shaders = Vec::new();
        for (kind, src) in [(glow::VERTEX_SHADER, vert_src), (glow::FRAGMENT_SHADER, frag_src)] {
            let shader = gl.create_shader(kind)?;
            gl.shader_source(shader, src);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                return Err(format!("shader error: {}", gl.get_shader_info_log(shader)));
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }
        gl.link_program(program);
        for shader in shaders {
            gl.delete_shader(shader);
        }
        if !gl.get_program_link_status(program) {
            return Err(format!("link error: {}", gl.get_program_info_log(program)));
        }
        Ok(program)
    }
}

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &glam::Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn as_bytes<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_normal = a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;

in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    // TripoSR winding is not consistent, light both sides
    float diffuse = abs(dot(normalize(v_normal), u_light_dir));
    frag_color = vec4(v_color * (0.3 + diffuse * 0.7), 1.0);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_grid_layout() {
        let grid = floor_grid(2, 0.5);
        // 5 lines each way, 2 vertices per line, 7 floats per vertex
        assert_eq!(grid.len(), 5 * 2 * 2 * 7);
        assert!(grid.chunks_exact(7).all(|v| v[1] == FLOOR_Y));
        assert_eq!(&grid[..3], &[-1.0, FLOOR_Y, -1.0]);
    }
}
