use crate::image_classifier::impl_tract_onnx::ImageClassifierTractOnnx;
use crate::image_classifier::interface::{ImageClassifier, InputTensor, Label};
use crate::image_classifier::test::fixture::Fixture;
use crate::image_classifier::tract::image::image_to_tensor;
use image::{DynamicImage, ImageBuffer, Luma};
use tract_onnx::pb;
use tract_onnx::prelude::*;

fn float_value(name: &str) -> pb::ValueInfoProto {
    pb::ValueInfoProto {
        name: name.to_string(),
        r#type: Some(pb::TypeProto {
            value: Some(pb::type_proto::Value::TensorType(pb::type_proto::Tensor {
                elem_type: pb::tensor_proto::DataType::Float as i32,
                ..Default::default()
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn node(op_type: &str, input: &str, output: &str) -> pb::NodeProto {
    pb::NodeProto {
        name: output.to_string(),
        op_type: op_type.to_string(),
        input: vec![input.to_string()],
        output: vec![output.to_string()],
        ..Default::default()
    }
}

/// Graph from "image" to `output` through `nodes`, opset 13.
fn onnx_model(nodes: Vec<pb::NodeProto>, output: &str) -> InferenceModel {
    let proto = pb::ModelProto {
        ir_version: 7,
        opset_import: vec![pb::OperatorSetIdProto {
            domain: String::new(),
            version: 13,
        }],
        graph: Some(pb::GraphProto {
            name: "test".to_string(),
            node: nodes,
            input: vec![float_value("image")],
            output: vec![float_value(output)],
            ..Default::default()
        }),
        ..Default::default()
    };

    tract_onnx::onnx().model_for_proto_model(&proto).unwrap()
}

/// sigmoid(mean(pixels)): white is ~0.731, black is exactly 0.5.
fn mean_sigmoid_classifier(f: &Fixture) -> ImageClassifierTractOnnx {
    let mut mean = node("ReduceMean", "image", "mean");
    mean.attribute = vec![pb::AttributeProto {
        name: "axes".to_string(),
        r#type: pb::attribute_proto::AttributeType::Ints as i32,
        ints: vec![1, 2, 3],
        ..Default::default()
    }];
    let model = onnx_model(vec![mean, node("Sigmoid", "mean", "probability")], "probability");

    ImageClassifierTractOnnx::from_inference_model(model, f.config.model.clone()).unwrap()
}

fn solid(value: u8) -> InputTensor {
    let img = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(640, 480, Luma([value])));
    image_to_tensor(&img, 300, 300)
}

#[test]
fn test_white_image() {
    let f = Fixture::new();
    let classifier = mean_sigmoid_classifier(&f);

    let prediction = classifier.predict(&solid(255)).unwrap();

    assert!((prediction.probability() - 0.7310586).abs() < 1e-4);
    assert_eq!(prediction.label(f.config.label_threshold), Label::Hotdog);
}

#[test]
fn test_black_image() {
    let f = Fixture::new();
    let classifier = mean_sigmoid_classifier(&f);

    let prediction = classifier.predict(&solid(0)).unwrap();

    assert_eq!(prediction.probability(), 0.5);
    assert_eq!(prediction.label(f.config.label_threshold), Label::NotHotdog);
}

#[test]
fn test_wrong_input_shape() {
    let f = Fixture::new();
    let classifier = mean_sigmoid_classifier(&f);
    let small = InputTensor::new(tract_ndarray::Array4::zeros((1, 10, 10, 1)));

    let error = classifier.predict(&small).unwrap_err().to_string();

    assert!(error.starts_with("input shape [1, 10, 10, 1]"), "{}", error);
}

#[test]
fn test_output_that_is_not_a_single_probability() {
    let f = Fixture::new();
    let model = onnx_model(vec![node("Identity", "image", "pixels")], "pixels");
    let classifier =
        ImageClassifierTractOnnx::from_inference_model(model, f.config.model.clone()).unwrap();

    let error = classifier.predict(&solid(255)).unwrap_err().to_string();

    assert_eq!(
        error,
        "model output shape [1, 300, 300, 1] is not a single probability"
    );
}
