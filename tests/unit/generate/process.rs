use super::*;
use crate::generate::prompt::AspectRatio;

fn request() -> GenerationRequest {
    GenerationRequest {
        prompt: "a cone".to_owned(),
        aspect_ratio: AspectRatio::Square,
        reference: None,
    }
}

#[cfg(unix)]
#[test]
fn reads_image_json_from_stdout() {
    let generator = ProcessGenerator::new("sh").args([
        "-c",
        r#"cat > /dev/null; printf '{"mime_type":"image/png","data":"AAEC"}'"#,
    ]);
    let image = generator.generate(&request()).unwrap();
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.into_payload().unwrap().bytes(), &[0, 1, 2]);
}

#[cfg(unix)]
#[test]
fn request_is_written_to_stdin() {
    // Succeeds only when the request JSON arrives on stdin.
    let generator = ProcessGenerator::new("sh").arg("-c").arg(
        r#"grep -q '"aspect_ratio":"1:1"' && printf '{"mime_type":"image/png","data":"AA=="}'"#,
    );
    assert!(generator.generate(&request()).is_ok());
}

#[cfg(unix)]
#[test]
fn nonzero_exit_is_a_generation_error() {
    let generator = ProcessGenerator::new("sh").args(["-c", "echo quota exceeded >&2; exit 3"]);
    let err = generator.generate(&request()).unwrap_err();
    assert!(matches!(err, DraggenError::Generation(ref m) if m.contains("quota exceeded")));
}

#[cfg(unix)]
#[test]
fn garbage_output_is_a_generation_error() {
    let generator = ProcessGenerator::new("sh").args(["-c", "cat > /dev/null; echo hello"]);
    assert!(matches!(
        generator.generate(&request()),
        Err(DraggenError::Generation(_))
    ));
}

#[test]
fn missing_program_is_a_generation_error() {
    let generator = ProcessGenerator::new("/nonexistent/draggen-generator");
    assert!(matches!(
        generator.generate(&request()),
        Err(DraggenError::Generation(_))
    ));
}
